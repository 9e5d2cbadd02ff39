//! Integration test: grow a vine, animate it to completion, and export the
//! draw log to SVG.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use vinery_pipeline::{Dimensions, DrawInstruction, Scheduler, Session, VineConfig};

struct Immediate;

impl Scheduler for Immediate {
    fn request_frame(&mut self) {}
}

#[test]
fn vine_draw_log_to_svg() {
    let dimensions = Dimensions::new(800, 600);
    let config = VineConfig::default();
    let mut session = Session::new(
        config.clone(),
        dimensions,
        None,
        StdRng::seed_from_u64(2024),
    )
    .expect("build should succeed");

    let mut draws: Vec<DrawInstruction> = Vec::new();
    while session
        .frame(&mut draws, &mut Immediate)
        .unwrap()
        .requested
    {}

    let expected = session
        .path()
        .total_substeps(config.animator.angular_speed);
    assert_eq!(draws.len() as u64, expected);

    let svg = vinery_export::to_svg(
        &draws,
        dimensions,
        session.scene(),
        &vinery_export::SvgMetadata::default(),
    );
    assert!(svg.contains("<svg"));
    assert_eq!(svg.matches("<line ").count(), draws.len());
    assert!(svg.contains("</svg>"));

    let d = vinery_export::arc_path_data(&session.path().arcs, &config.animator);
    let drawn_arcs = session
        .path()
        .arcs
        .iter()
        .filter(|a| a.substeps(config.animator.angular_speed) > 0)
        .count();
    assert_eq!(d.matches('M').count(), drawn_arcs);

    // Write the SVG under target/ so it can be inspected.
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    let target = workspace_root.join("target");
    if target.is_dir() {
        let output_path = target.join("vine-draw-log.svg");
        std::fs::write(&output_path, &svg).unwrap();
        eprintln!("SVG written to {output_path:?} ({} bytes)", svg.len());
    }
}
