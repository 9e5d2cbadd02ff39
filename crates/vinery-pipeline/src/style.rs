//! Per-build scene setup and per-chord stroke styling.

use std::f64::consts::FRAC_PI_4;
use std::fmt;

use noise::{NoiseFn, OpenSimplex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animate::{Chord, DrawInstruction};
use crate::color::Rgb;
use crate::config::StyleConfig;
use crate::palette;

/// Stroke end style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Semicircular ends.
    Round,
    /// Flat ends at the endpoints.
    Butt,
}

impl LineCap {
    /// The SVG / canvas keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Butt => "butt",
        }
    }
}

/// Random per-build presentation choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Name of the palette the background came from.
    pub palette: String,
    /// Gradient color at the top edge (second darkest palette color).
    pub background_top: Rgb,
    /// Gradient color at the bottom edge (darkest palette color, swapped
    /// for a darkened one when it is near black).
    pub background_bottom: Rgb,
    /// Even mix of the two background colors.
    pub env: Rgb,
    /// Stroke end style.
    pub line_cap: LineCap,
    /// Exponent shaping the stroke width noise, in `[1, 1.3)`.
    pub width_power: f64,
    /// Seed for the coherent noise field.
    pub noise_seed: u32,
}

impl Scene {
    /// Draw a fresh scene.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let palette = palette::pick(rng);
        let sorted = palette.background_colors(rng);
        let bottom = sorted.first().copied().unwrap_or(Rgb::BLACK);
        let top = sorted.get(1).copied().unwrap_or(bottom);
        Self {
            palette: palette.name.to_owned(),
            background_top: top,
            background_bottom: bottom,
            env: bottom.mix(top, 0.5),
            line_cap: if rng.random_bool(0.5) {
                LineCap::Round
            } else {
                LineCap::Butt
            },
            width_power: rng.random::<f64>().mul_add(0.3, 1.0),
            noise_seed: rng.random(),
        }
    }
}

/// Computes stroke color and width for each chord.
pub struct StrokeStyler {
    style: StyleConfig,
    env: Rgb,
    width_power: f64,
    noise: OpenSimplex,
}

impl fmt::Debug for StrokeStyler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrokeStyler")
            .field("style", &self.style)
            .field("env", &self.env)
            .field("width_power", &self.width_power)
            .finish_non_exhaustive()
    }
}

impl StrokeStyler {
    /// A styler for `scene`.
    #[must_use]
    pub fn new(style: StyleConfig, scene: &Scene) -> Self {
        Self {
            style,
            env: scene.env,
            width_power: scene.width_power,
            noise: OpenSimplex::new(scene.noise_seed),
        }
    }

    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let s = self.style.noise_scale;
        self.noise.get([x * s, y * s, z * s])
    }

    /// Stroke color: shadow towards plant by the chord's facing, then
    /// towards the background, then towards the light by the noise field.
    #[must_use]
    pub fn color(&self, chord: &Chord) -> Rgb {
        let m = chord.midpoint();
        let facing = 0.5f64.mul_add((chord.start_angle + FRAC_PI_4).cos(), 0.5);
        let n = self.sample(m.x, m.y, 0.0);
        let s = &self.style;
        s.shadow
            .mix(s.plant, facing)
            .mix(self.env, s.env_weight)
            .mix(s.light, s.light_weight.mul_add(n, s.light_weight))
    }

    /// Stroke width: `floor(1 + r^power * max_width)` with `r` the noise
    /// field at the chord midpoint, keyed by arc index.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn width(&self, chord: &Chord) -> f64 {
        let m = chord.midpoint();
        let r = 0.5f64
            .mul_add(self.sample(m.x, m.y, chord.arc_index as f64), 0.5)
            .clamp(0.0, 1.0);
        r.powf(self.width_power)
            .mul_add(self.style.max_width, 1.0)
            .floor()
    }

    /// The full draw instruction for `chord`.
    #[must_use]
    pub fn instruction(&self, chord: &Chord) -> DrawInstruction {
        DrawInstruction {
            x0: chord.from.x,
            y0: chord.from.y,
            x1: chord.to.x,
            y1: chord.to.y,
            stroke: self.color(chord),
            width: self.width(chord),
            background: chord.background,
        }
    }
}
