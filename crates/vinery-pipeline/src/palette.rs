//! Built-in color palettes for scene backgrounds.

use rand::Rng;

use crate::color::Rgb;

/// A named set of colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Display name.
    pub name: &'static str,
    /// Colors in no particular order.
    pub colors: &'static [Rgb],
}

/// Luminance below which the darkest color is too close to black to use
/// as a background.
pub const DARK_LIMIT: f64 = 0.18;

impl Palette {
    /// The colors ordered from darkest to lightest.
    #[must_use]
    pub fn sorted_by_luminance(&self) -> Vec<Rgb> {
        let mut colors = self.colors.to_vec();
        colors.sort_by(|a, b| a.luminance().total_cmp(&b.luminance()));
        colors
    }

    /// Background colors, darkest first.
    ///
    /// Like [`sorted_by_luminance`](Self::sorted_by_luminance), except that
    /// a darkest color under [`DARK_LIMIT`] is replaced by a random palette
    /// color mixed a quarter of the way to black. The rest of the order is
    /// left alone.
    pub fn background_colors<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Rgb> {
        let mut colors = self.sorted_by_luminance();
        if colors.first().is_some_and(|c| c.luminance() < DARK_LIMIT) {
            let pick = colors[rng.random_range(0..colors.len())];
            colors[0] = pick.mix(Rgb::BLACK, 0.25);
        }
        colors
    }
}

/// Palettes shipped with the crate. Every palette has at least two colors.
pub const BUILTIN: &[Palette] = &[
    Palette {
        name: "forest-floor",
        colors: &[
            Rgb::new(0x1b, 0x26, 0x1f),
            Rgb::new(0x3c, 0x4f, 0x3a),
            Rgb::new(0x8a, 0x9a, 0x5b),
            Rgb::new(0xd8, 0xc9, 0x9b),
            Rgb::new(0xf2, 0xe8, 0xcf),
        ],
    },
    Palette {
        name: "dusk",
        colors: &[
            Rgb::new(0x14, 0x1b, 0x41),
            Rgb::new(0x30, 0x6b, 0xac),
            Rgb::new(0x6f, 0x9c, 0xeb),
            Rgb::new(0x98, 0xb9, 0xf2),
            Rgb::new(0x91, 0x8e, 0xf4),
        ],
    },
    Palette {
        name: "terracotta",
        colors: &[
            Rgb::new(0x26, 0x46, 0x53),
            Rgb::new(0x2a, 0x9d, 0x8f),
            Rgb::new(0xe9, 0xc4, 0x6a),
            Rgb::new(0xf4, 0xa2, 0x61),
            Rgb::new(0xe7, 0x6f, 0x51),
        ],
    },
    Palette {
        name: "greenhouse",
        colors: &[
            Rgb::new(0x08, 0x1c, 0x15),
            Rgb::new(0x1b, 0x43, 0x32),
            Rgb::new(0x2d, 0x6a, 0x4f),
            Rgb::new(0x52, 0xb7, 0x88),
            Rgb::new(0xb7, 0xe4, 0xc7),
        ],
    },
    Palette {
        name: "plum",
        colors: &[
            Rgb::new(0x2b, 0x0f, 0x2e),
            Rgb::new(0x5a, 0x23, 0x4f),
            Rgb::new(0x9c, 0x4f, 0x7a),
            Rgb::new(0xe0, 0x9f, 0xae),
            Rgb::new(0xf6, 0xe3, 0xd4),
        ],
    },
    Palette {
        name: "slate",
        colors: &[
            Rgb::new(0x22, 0x22, 0x2a),
            Rgb::new(0x45, 0x4d, 0x5a),
            Rgb::new(0x76, 0x84, 0x8f),
            Rgb::new(0xb8, 0xc1, 0xc6),
            Rgb::new(0xec, 0xef, 0xf1),
        ],
    },
];

/// Pick one of the built-in palettes uniformly at random.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static Palette {
    &BUILTIN[rng.random_range(0..BUILTIN.len())]
}

/// Look up a built-in palette by name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static Palette> {
    BUILTIN.iter().find(|p| p.name == name)
}
