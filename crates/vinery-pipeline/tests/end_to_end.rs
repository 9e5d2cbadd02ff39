//! Integration tests: build a vine at the reference size and animate it to
//! completion.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use image::RgbaImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use vinery_pipeline::angle::wrap;
use vinery_pipeline::{
    Animator, Dimensions, PathError, Phase, Scheduler, Tick, VineConfig, build,
};

const SURFACE: Dimensions = Dimensions::new(800, 600);

#[derive(Default)]
struct FrameCounter {
    requested: usize,
}

impl Scheduler for FrameCounter {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

#[test]
fn reference_build_animates_every_substep() {
    let config = VineConfig::default();
    let mut rng = StdRng::seed_from_u64(90);
    let path = build(&config, SURFACE, None, &mut rng).expect("build should terminate");

    assert_eq!(path.sites.len(), 180);
    assert_eq!(path.moves.len(), 90);
    assert!(!path.arcs.is_empty());
    assert!(path.arcs.len() >= path.moves.len());

    let speed = config.animator.angular_speed;
    let expected = path.total_substeps(speed);

    let mut animator = Animator::new(config.animator.clone());
    let mut scheduler = FrameCounter::default();
    let mut drawn = 0_u64;
    let mut frames = 0_usize;
    loop {
        let report = animator.frame(&path.arcs, |_| drawn += 1, &mut scheduler);
        frames += 1;
        assert!(report.chords <= config.animator.substeps_per_frame);
        if !report.requested {
            break;
        }
    }

    assert_eq!(drawn, expected);
    assert_eq!(animator.phase(), Phase::Finished);
    assert_eq!(scheduler.requested, frames - 1);
    assert_eq!(animator.state().remaining_substeps, 0);
}

#[test]
fn chords_stay_on_their_arcs_in_order() {
    let config = VineConfig::default();
    let mut rng = StdRng::seed_from_u64(91);
    let path = build(&config, SURFACE, None, &mut rng).unwrap();

    let mut animator = Animator::new(config.animator.clone());
    let mut last_index = 0;
    while let Tick::Chord(chord) = animator.tick(&path.arcs) {
        assert!(chord.arc_index >= last_index, "arcs drawn out of order");
        last_index = chord.arc_index;

        let arc = path.arcs[chord.arc_index];
        assert!((chord.from.distance(arc.center) - arc.radius).abs() < 1e-6);
        assert!((chord.to.distance(arc.center) - arc.radius).abs() < 1e-6);
        assert!((0.0..std::f64::consts::TAU).contains(&chord.start_angle));
        assert!((chord.end_angle - wrap(chord.end_angle)).abs() < f64::EPSILON);
    }
}

#[test]
fn relaxation_settles_at_reference_size() {
    let config = VineConfig::default();
    let mut rng = StdRng::seed_from_u64(92);
    let path = build(&config, SURFACE, None, &mut rng).unwrap();
    let d = &path.relax.displacements;
    assert_eq!(d.len(), config.sampler.relax_passes);
    assert!(d[d.len() - 1] <= d[0]);
}

#[test]
fn masked_build_keeps_sites_inside_mask() {
    // Opaque left half, transparent right half.
    let mask = RgbaImage::from_fn(SURFACE.width, SURFACE.height, |x, _| {
        image::Rgba([0, 0, 0, if x < SURFACE.width / 2 { 255 } else { 0 }])
    });
    let mut config = VineConfig::default();
    config.sampler.relax_passes = 0;
    let mut rng = StdRng::seed_from_u64(93);
    let path = build(&config, SURFACE, Some(&mask), &mut rng).unwrap();
    assert!(path.sites.iter().all(|p| p.x < 400.0));
}

#[test]
fn transparent_mask_is_rejected() {
    let mask = RgbaImage::new(SURFACE.width, SURFACE.height);
    let mut config = VineConfig::default();
    config.sampler.max_candidates = 10_000;
    let mut rng = StdRng::seed_from_u64(94);
    let result = build(&config, SURFACE, Some(&mask), &mut rng);
    assert!(matches!(
        result,
        Err(PathError::MaskRejected {
            accepted: 0,
            required: 180
        })
    ));
}
