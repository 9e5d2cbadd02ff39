//! vinery-export: Pure format serializers (sans-IO)
//!
//! Converts vine draw logs and arc lists into output formats. Currently
//! supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, arc_path_data, to_svg};
