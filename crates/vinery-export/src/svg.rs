//! SVG export serializer.
//!
//! Converts a draw log (the [`DrawInstruction`]s a drawing emitted, in
//! order) into an SVG string using the [`svg`] crate for document
//! construction and XML escaping.
//!
//! The scene background becomes a vertical linear gradient behind a
//! `<rect>`; every chord becomes one `<line>` carrying its own stroke color
//! and width. Chords from revisit arcs get `class="background"`.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{
    Definitions, Description, Element, Group, Line, LinearGradient, Rectangle, Stop, Title,
};
use svg::node::{Node, Text, Value};

use vinery_pipeline::{Animator, AnimatorConfig, Arc, Dimensions, DrawInstruction, Scene, Tick};

/// Id of the background gradient definition.
const BACKGROUND_ID: &str = "background";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`VineConfig`](vinery_pipeline::VineConfig) JSON,
    /// emitted inside `<metadata>` in a namespaced `<vinery:config>`
    /// element.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute tracing every arc chord by chord.
///
/// Each arc starts a new subpath (`M`) at its first chord and continues
/// with `L` to the end of every chord, using the same stepping as the
/// animator. Arcs too short for a single chord are skipped. Returns an
/// empty string when nothing would be drawn.
#[must_use]
pub fn arc_path_data(arcs: &[Arc], config: &AnimatorConfig) -> String {
    let mut animator = Animator::new(config.clone());
    let mut data = Data::new();
    let mut current = None;
    while let Tick::Chord(chord) = animator.tick(arcs) {
        if current != Some(chord.arc_index) {
            data = data.move_to((chord.from.x, chord.from.y));
            current = Some(chord.arc_index);
        }
        data = data.line_to((chord.to.x, chord.to.y));
    }
    if current.is_none() {
        return String::new();
    }
    String::from(Value::from(data))
}

fn background_gradient(scene: &Scene) -> LinearGradient {
    LinearGradient::new()
        .set("id", BACKGROUND_ID)
        .set("x1", 0)
        .set("y1", 0)
        .set("x2", 0)
        .set("y2", 1)
        .add(
            Stop::new()
                .set("offset", 0)
                .set("stop-color", scene.background_top.to_hex()),
        )
        .add(
            Stop::new()
                .set("offset", 1)
                .set("stop-color", scene.background_bottom.to_hex()),
        )
}

fn chord_line(draw: &DrawInstruction) -> Line {
    let line = Line::new()
        .set("x1", draw.x0)
        .set("y1", draw.y0)
        .set("x2", draw.x1)
        .set("y2", draw.y1)
        .set("stroke", draw.stroke.to_hex())
        .set("stroke-width", draw.width);
    if draw.background {
        line.set("class", "background")
    } else {
        line
    }
}

/// Serialize a draw log to an SVG document string.
///
/// The document is `dimensions` pixels in size with a matching
/// `viewBox`. Chords are grouped under one `<g>` carrying the scene's
/// line cap.
#[must_use]
pub fn to_svg(
    draws: &[DrawInstruction],
    dimensions: Dimensions,
    scene: &Scene,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("vinery:config");
        config_el.assign("xmlns:vinery", "https://github.com/altendky/vinery/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    doc = doc
        .add(Definitions::new().add(background_gradient(scene)))
        .add(
            Rectangle::new()
                .set("width", w)
                .set("height", h)
                .set("fill", format!("url(#{BACKGROUND_ID})")),
        );

    let mut chords = Group::new()
        .set("fill", "none")
        .set("stroke-linecap", scene.line_cap.as_str());
    for draw in draws {
        chords = chords.add(chord_line(draw));
    }
    doc = doc.add(chords);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vinery_pipeline::{LineCap, Point, Rgb};

    use super::*;

    fn scene() -> Scene {
        Scene {
            palette: "test".to_owned(),
            background_top: Rgb::new(0x22, 0x33, 0x44),
            background_bottom: Rgb::new(0x01, 0x02, 0x03),
            env: Rgb::new(0x12, 0x1a, 0x24),
            line_cap: LineCap::Butt,
            width_power: 1.0,
            noise_seed: 0,
        }
    }

    fn draw(x0: f64, y0: f64, x1: f64, y1: f64, background: bool) -> DrawInstruction {
        DrawInstruction {
            x0,
            y0,
            x1,
            y1,
            stroke: Rgb::new(0, 150, 72),
            width: 3.0,
            background,
        }
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    // --- arc_path_data ---

    #[test]
    fn arc_path_data_empty() {
        assert_eq!(arc_path_data(&[], &AnimatorConfig::default()), "");
    }

    #[test]
    fn arc_path_data_skips_dot_arcs() {
        let dot = Arc::between(Point::new(3.0, 3.0), Point::new(3.0, 3.0), true, false);
        assert_eq!(arc_path_data(&[dot], &AnimatorConfig::default()), "");
    }

    #[test]
    fn arc_path_data_one_subpath_per_arc() {
        let config = AnimatorConfig {
            angular_speed: 1.0,
            ..AnimatorConfig::default()
        };
        let arcs = [
            Arc::between(Point::new(0.0, 0.0), Point::new(20.0, 0.0), true, false),
            Arc::between(Point::new(20.0, 0.0), Point::new(40.0, 0.0), false, false),
        ];
        let d = arc_path_data(&arcs, &config);
        assert!(d.starts_with("M0,"));
        assert_eq!(d.matches('M').count(), 2);
        // floor(π / 1.0) = 3 chords per arc.
        assert_eq!(d.matches('L').count(), 6);
        assert!(d.ends_with("L40,0"));
    }

    // --- to_svg ---

    #[test]
    fn empty_log_has_background_only() {
        let svg = to_svg(&[], Dimensions::new(100, 50), &scene(), &no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"width="100""#));
        assert!(svg.contains(r#"height="50""#));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(svg.contains("<linearGradient"));
        assert!(svg.contains(r#"fill="url(#background)""#));
        assert!(!svg.contains("<line "));
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let svg = to_svg(&[], Dimensions::new(10, 10), &scene(), &no_meta());
        let top = svg.find("#223344").unwrap();
        let bottom = svg.find("#010203").unwrap();
        assert!(top < bottom);
    }

    #[test]
    fn one_line_per_chord() {
        let draws = [
            draw(1.0, 2.0, 3.0, 4.0, false),
            draw(3.0, 4.0, 5.5, 6.25, false),
        ];
        let svg = to_svg(&draws, Dimensions::new(10, 10), &scene(), &no_meta());
        assert_eq!(svg.matches("<line ").count(), 2);
        assert!(svg.contains(r#"x2="5.5""#));
        assert!(svg.contains(r#"y2="6.25""#));
        assert!(svg.contains(r##"stroke="#009648""##));
        assert!(svg.contains(r#"stroke-width="3""#));
    }

    #[test]
    fn line_cap_on_group() {
        let svg = to_svg(&[], Dimensions::new(10, 10), &scene(), &no_meta());
        assert!(svg.contains(r#"stroke-linecap="butt""#));
    }

    #[test]
    fn background_chords_are_tagged() {
        let draws = [draw(0.0, 0.0, 1.0, 1.0, true), draw(1.0, 1.0, 2.0, 2.0, false)];
        let svg = to_svg(&draws, Dimensions::new(10, 10), &scene(), &no_meta());
        assert_eq!(svg.matches(r#"class="background""#).count(), 1);
    }

    #[test]
    fn lines_keep_draw_order() {
        let draws = [draw(7.0, 0.0, 8.0, 0.0, false), draw(1.0, 0.0, 2.0, 0.0, false)];
        let svg = to_svg(&draws, Dimensions::new(10, 10), &scene(), &no_meta());
        let first = svg.find(r#"x1="7""#).unwrap();
        let second = svg.find(r#"x1="1""#).unwrap();
        assert!(first < second);
    }

    #[test]
    fn metadata_elements() {
        let meta = SvgMetadata {
            title: Some("vine <1>"),
            description: Some("seed 42"),
            config_json: Some(r#"{"walk":{"steps":12}}"#),
        };
        let svg = to_svg(&[], Dimensions::new(10, 10), &scene(), &meta);
        assert!(svg.contains("<title>vine &lt;1&gt;</title>"));
        assert!(svg.contains("<desc>seed 42</desc>"));
        assert!(svg.contains("<vinery:config"));
        assert!(svg.contains("xmlns:vinery="));
        let title = svg.find("<title>").unwrap();
        let rect = svg.find("<rect").unwrap();
        assert!(title < rect);
    }

    #[test]
    fn svg_ends_with_closing_tag() {
        let svg = to_svg(
            &[draw(0.0, 0.0, 1.0, 1.0, false)],
            Dimensions::new(10, 10),
            &scene(),
            &no_meta(),
        );
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
