//! Relaxed point sampling: uniform candidates, optional mask rejection,
//! then Lloyd relaxation over the clipped Voronoi partition.
//!
//! Relaxation spreads the sites evenly, which is what keeps the walked
//! path from bunching up. Final sites are rounded to whole pixels before
//! the last partition is built.

use std::collections::HashSet;

use rand::Rng;

use crate::config::SamplerConfig;
use crate::mask::CoverageMask;
use crate::partition::Partition;
use crate::types::{Dimensions, PathError, Point};

/// Per-pass relaxation diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelaxReport {
    /// Mean distance each site moved to its cell centroid, per pass.
    pub displacements: Vec<f64>,
}

/// A successfully sampled partition.
#[derive(Debug, Clone)]
pub struct Sampled {
    /// The final partition over rounded, relaxed sites.
    pub partition: Partition,
    /// Relaxation diagnostics for the successful attempt.
    pub report: RelaxReport,
    /// Number of attempts used (1 when the first attempt succeeded).
    pub attempts: usize,
}

/// Sample, relax, and partition `config.required_sites()` points.
///
/// Degenerate partitions are resampled from scratch, up to
/// `config.max_attempts` times.
///
/// # Errors
///
/// Returns [`PathError::MaskRejected`] if the mask leaves too few
/// candidates, and [`PathError::ExhaustedRetries`] if every attempt
/// degenerated.
pub fn sample<R: Rng + ?Sized>(
    config: &SamplerConfig,
    dimensions: Dimensions,
    mask: Option<&dyn CoverageMask>,
    rng: &mut R,
) -> Result<Sampled, PathError> {
    for attempt in 1..=config.max_attempts {
        let candidates = draw_candidates(config, dimensions, mask, rng)?;
        let Some((sites, report)) = relax(candidates, config.relax_passes, dimensions) else {
            tracing::warn!(attempt, "relaxation degenerated, resampling");
            continue;
        };

        let final_sites = round_unique(&sites);
        if final_sites.len() < sites.len() {
            tracing::warn!(
                attempt,
                collapsed = sites.len() - final_sites.len(),
                "relaxed sites collapsed when rounded, resampling"
            );
            continue;
        }
        match Partition::build(&final_sites, dimensions) {
            Some(partition) if partition.first_nonempty().is_some() => {
                tracing::debug!(
                    attempt,
                    sites = partition.len(),
                    edges = partition.edges().len(),
                    "partition ready"
                );
                return Ok(Sampled {
                    partition,
                    report,
                    attempts: attempt,
                });
            }
            _ => tracing::warn!(attempt, "final partition has no usable cells, resampling"),
        }
    }
    Err(PathError::ExhaustedRetries {
        attempts: config.max_attempts,
    })
}

/// Draw uniformly distributed, pixel-rounded candidates inside the
/// centered sampling region, keeping only those the mask covers.
///
/// Candidates are distinct: a draw landing on an already accepted pixel is
/// discarded.
///
/// # Errors
///
/// Returns [`PathError::MaskRejected`] if `config.max_candidates` draws
/// do not yield enough accepted points.
pub fn draw_candidates<R: Rng + ?Sized>(
    config: &SamplerConfig,
    dimensions: Dimensions,
    mask: Option<&dyn CoverageMask>,
    rng: &mut R,
) -> Result<Vec<Point>, PathError> {
    let required = config.required_sites();
    let center = dimensions.center();
    let w = f64::from(dimensions.width) * config.fill;
    let h = f64::from(dimensions.height) * config.fill;
    let left = center.x - w / 2.0;
    let top = center.y - h / 2.0;

    let mut points = Vec::with_capacity(required);
    let mut taken: HashSet<(i64, i64)> = HashSet::with_capacity(required);
    let mut draws = 0;
    while points.len() < required {
        if draws >= config.max_candidates {
            return Err(PathError::MaskRejected {
                accepted: points.len(),
                required,
            });
        }
        draws += 1;
        let p = Point::new(
            rng.random::<f64>().mul_add(w, left),
            rng.random::<f64>().mul_add(h, top),
        )
        .round();
        if mask.is_none_or(|m| m.coverage(p) > config.coverage_threshold)
            && taken.insert(pixel_key(p))
        {
            points.push(p);
        }
    }
    Ok(points)
}

/// Run `passes` Lloyd iterations, replacing each site with its cell
/// centroid. Sites whose cell has no area stay where they are.
///
/// Returns `None` if a partition could not be built along the way.
#[must_use]
pub fn relax(
    mut sites: Vec<Point>,
    passes: usize,
    dimensions: Dimensions,
) -> Option<(Vec<Point>, RelaxReport)> {
    let mut report = RelaxReport::default();
    for pass in 0..passes {
        let partition = Partition::build(&sites, dimensions)?;
        let moved: Vec<(Point, Point)> = partition
            .sites()
            .iter()
            .zip(partition.centroids())
            .map(|(&site, centroid)| (site, centroid.unwrap_or(site)))
            .collect();
        if moved.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = moved.iter().map(|(s, c)| s.distance(*c)).sum::<f64>() / moved.len() as f64;
        tracing::debug!(pass, sites = moved.len(), mean_displacement = mean, "relaxed");
        report.displacements.push(mean);
        sites = moved.into_iter().map(|(_, c)| c).collect();
    }
    Some((sites, report))
}

#[allow(clippy::cast_possible_truncation)]
fn pixel_key(p: Point) -> (i64, i64) {
    (p.x as i64, p.y as i64)
}

/// Round to whole pixels, dropping sites that collapse onto an earlier one.
fn round_unique(sites: &[Point]) -> Vec<Point> {
    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(sites.len());
    sites
        .iter()
        .map(|p| p.round())
        .filter(|p| seen.insert(pixel_key(*p)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::GrayImage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const SURFACE: Dimensions = Dimensions::new(800, 600);

    #[test]
    fn candidates_stay_in_region_and_are_whole_pixels() {
        let config = SamplerConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let points = draw_candidates(&config, SURFACE, None, &mut rng).unwrap();
        assert_eq!(points.len(), config.required_sites());
        // 0.84 of 800x600 centered: x in [64, 736], y in [48, 552].
        for p in &points {
            assert!((64.0..=736.0).contains(&p.x), "x = {}", p.x);
            assert!((48.0..=552.0).contains(&p.y), "y = {}", p.y);
            assert!((p.x - p.x.round()).abs() < f64::EPSILON);
            assert!((p.y - p.y.round()).abs() < f64::EPSILON);
        }
        let unique: HashSet<(i64, i64)> = points.iter().map(|p| pixel_key(*p)).collect();
        assert_eq!(unique.len(), points.len());
    }

    #[test]
    fn collinear_mask_exhausts_retries() {
        // Only row 300 is covered, so every attempt samples a straight line.
        let mask = GrayImage::from_fn(800, 600, |_, y| image::Luma([if y == 300 { 255 } else { 0 }]));
        let config = SamplerConfig {
            count: 5,
            ..SamplerConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let result = sample(&config, SURFACE, Some(&mask), &mut rng);
        assert!(matches!(
            result,
            Err(PathError::ExhaustedRetries { attempts: 8 })
        ));
    }

    #[test]
    fn mask_rejects_uncovered_candidates() {
        // Only the left half of the surface is covered.
        let mask = GrayImage::from_fn(800, 600, |x, _| image::Luma([if x < 400 { 255 } else { 0 }]));
        let config = SamplerConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let points = draw_candidates(&config, SURFACE, Some(&mask), &mut rng).unwrap();
        assert_eq!(points.len(), config.required_sites());
        assert!(points.iter().all(|p| p.x < 400.0));
    }

    #[test]
    fn empty_mask_exhausts_candidate_budget() {
        let mask = GrayImage::new(800, 600);
        let config = SamplerConfig {
            max_candidates: 500,
            ..SamplerConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let result = draw_candidates(&config, SURFACE, Some(&mask), &mut rng);
        assert!(matches!(
            result,
            Err(PathError::MaskRejected {
                accepted: 0,
                required: 180
            })
        ));
    }

    #[test]
    fn sample_produces_requested_site_count() {
        let config = SamplerConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let sampled = sample(&config, SURFACE, None, &mut rng).unwrap();
        assert_eq!(sampled.partition.len(), config.required_sites());
        assert_eq!(sampled.attempts, 1);
        assert_eq!(sampled.report.displacements.len(), config.relax_passes);
        for p in sampled.partition.sites() {
            assert!((p.x - p.x.round()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn relaxation_settles() {
        let config = SamplerConfig {
            relax_passes: 6,
            ..SamplerConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let candidates = draw_candidates(&config, SURFACE, None, &mut rng).unwrap();
        let (_, report) = relax(candidates, config.relax_passes, SURFACE).unwrap();
        let first = report.displacements[0];
        let last = report.displacements[report.displacements.len() - 1];
        assert!(
            last <= first,
            "expected relaxation to settle: first pass {first}, last pass {last}"
        );
    }

    #[test]
    fn zero_passes_keeps_sites() {
        let sites = vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 20.0),
            Point::new(30.0, 60.0),
        ];
        let (out, report) = relax(sites.clone(), 0, SURFACE).unwrap();
        assert_eq!(out, sites);
        assert!(report.displacements.is_empty());
    }

    #[test]
    fn round_unique_drops_collisions() {
        let sites = vec![
            Point::new(1.2, 1.4),
            Point::new(0.9, 0.6),
            Point::new(5.5, 2.0),
        ];
        let out = round_unique(&sites);
        assert_eq!(out, vec![Point::new(1.0, 1.0), Point::new(6.0, 2.0)]);
    }

    #[test]
    fn sample_propagates_mask_failure() {
        let mask = GrayImage::new(800, 600);
        let config = SamplerConfig {
            max_candidates: 200,
            ..SamplerConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(6);
        assert!(matches!(
            sample(&config, SURFACE, Some(&mask), &mut rng),
            Err(PathError::MaskRejected { .. })
        ));
    }
}
