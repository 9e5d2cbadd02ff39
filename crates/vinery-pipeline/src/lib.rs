//! vinery-pipeline: Vine path generation and arc animation (sans-IO).
//!
//! Grows a vine-like line drawing through:
//! relaxed point sampling -> Voronoi partition -> cell graph random walk
//! -> turn-to-arc decomposition -> frame-bounded arc animation.
//!
//! This crate has **no I/O dependencies**. Masks arrive as decoded
//! images, draw instructions leave through the [`Surface`] trait, and the
//! frame clock is the host's [`Scheduler`]. Rendering to pixels or files
//! lives in the `vinery` binary and `vinery-export`.

pub mod angle;
pub mod animate;
pub mod arc;
pub mod color;
pub mod config;
pub mod mask;
pub mod palette;
pub mod partition;
pub mod sampler;
pub mod session;
pub mod style;
pub mod types;
pub mod walk;

use rand::Rng;

pub use animate::{
    AnimationState, Animator, Chord, DrawInstruction, FrameReport, Phase, Scheduler, Surface,
    Tick,
};
pub use arc::{Arc, ArcPathBuilder, TurnKind};
pub use color::Rgb;
pub use config::{
    AnimatorConfig, DetourConfig, SamplerConfig, StyleConfig, VineConfig, WalkConfig,
};
pub use mask::CoverageMask;
pub use partition::{Partition, Site};
pub use sampler::RelaxReport;
pub use session::{RESTART_DELAY, Session};
pub use style::{LineCap, Scene, StrokeStyler};
pub use types::{Dimensions, GeometryError, PathError, Point, SiteId};
pub use walk::Move;

/// Result of one build: the arc list plus what it was derived from.
#[derive(Debug, Clone)]
pub struct ArcPath {
    /// Arcs in drawing order.
    pub arcs: Vec<Arc>,
    /// The walk the arcs were built from.
    pub moves: Vec<Move>,
    /// Final (rounded, relaxed) site positions.
    pub sites: Vec<Point>,
    /// Relaxation diagnostics.
    pub relax: RelaxReport,
    /// Sampling attempts used.
    pub attempts: usize,
}

impl ArcPath {
    /// Total chords the animator will draw at `speed`.
    #[must_use]
    pub fn total_substeps(&self, speed: f64) -> u64 {
        self.arcs.iter().map(|a| u64::from(a.substeps(speed))).sum()
    }
}

/// Build a vine path.
///
/// Samples `config.sampler.required_sites()` relaxed points inside
/// `dimensions` (filtered by `mask` if given), walks
/// `config.walk.steps` moves over their Voronoi adjacency, and turns the
/// walk into arcs.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Sample candidates and relax them (retrying degenerate partitions)
/// 3. Random walk over the cell graph
/// 4. Turn-to-arc decomposition
///
/// # Errors
///
/// Returns [`PathError::InvalidConfig`] if the configuration is invalid,
/// [`PathError::MaskRejected`] or [`PathError::ExhaustedRetries`] if
/// sampling fails, and [`PathError::NoStartingCell`] or
/// [`PathError::IsolatedCell`] if the walk cannot proceed.
#[tracing::instrument(skip(config, mask, rng))]
pub fn build<R: Rng + ?Sized>(
    config: &VineConfig,
    dimensions: Dimensions,
    mask: Option<&dyn CoverageMask>,
    rng: &mut R,
) -> Result<ArcPath, PathError> {
    config.validate()?;

    let sampled = sampler::sample(&config.sampler, dimensions, mask, rng)?;
    let moves = walk::walk(&sampled.partition, config.walk.steps, rng)?;
    let arcs = arc::build_arcs(&moves, &config.detour);

    tracing::info!(
        sites = sampled.partition.len(),
        moves = moves.len(),
        arcs = arcs.len(),
        attempts = sampled.attempts,
        "vine built"
    );

    Ok(ArcPath {
        arcs,
        moves,
        sites: sampled.partition.sites().to_vec(),
        relax: sampled.report,
        attempts: sampled.attempts,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn build_rejects_invalid_config() {
        let mut config = VineConfig::default();
        config.walk.steps = 0;
        let mut rng = StdRng::seed_from_u64(41);
        let result = build(&config, Dimensions::new(800, 600), None, &mut rng);
        assert!(matches!(result, Err(PathError::InvalidConfig(_))));
    }

    #[test]
    fn build_produces_at_least_one_arc_per_move() {
        let config = VineConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let path = build(&config, Dimensions::new(800, 600), None, &mut rng).unwrap();
        assert_eq!(path.moves.len(), config.walk.steps);
        assert!(path.arcs.len() >= path.moves.len());
        assert!(path.arcs.len() <= path.moves.len() * 4);
        assert_eq!(path.sites.len(), config.sampler.required_sites());
    }

    #[test]
    fn first_arc_spans_first_move() {
        let config = VineConfig::default();
        let mut rng = StdRng::seed_from_u64(43);
        let path = build(&config, Dimensions::new(800, 600), None, &mut rng).unwrap();
        let (arc, first) = (path.arcs[0], path.moves[0]);
        assert!(arc.clockwise);
        assert!(arc.point_at(arc.start_angle).distance(first.from.point) < 1e-9);
        assert!(arc.point_at(arc.end_angle).distance(first.to.point) < 1e-9);
        assert!(path.total_substeps(config.animator.angular_speed) > 0);
    }
}
