//! Tunable parameters for every stage of the vine pipeline.
//!
//! All parameters have defaults matching the reference drawing. Fields
//! are public; call [`VineConfig::validate`] before building if the
//! values came from user input.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::types::PathError;

/// Point sampling and Lloyd relaxation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Base number of sites. The partition holds `count * oversample`
    /// sites.
    pub count: usize,

    /// Oversampling factor applied to `count`.
    pub oversample: usize,

    /// Size of the sampling region as a fraction of the surface,
    /// centered on the surface.
    pub fill: f64,

    /// Number of Lloyd relaxation passes.
    pub relax_passes: usize,

    /// Mask coverage (0.0 to 1.0) a candidate must exceed to be kept.
    pub coverage_threshold: f64,

    /// Upper bound on candidate draws per attempt when a mask rejects
    /// points.
    pub max_candidates: usize,

    /// Upper bound on sampling attempts when the partition degenerates.
    pub max_attempts: usize,
}

impl SamplerConfig {
    /// Default base site count.
    pub const DEFAULT_COUNT: usize = 90;
    /// Default oversampling factor.
    pub const DEFAULT_OVERSAMPLE: usize = 2;
    /// Default sampling region fraction.
    pub const DEFAULT_FILL: f64 = 0.84;
    /// Default number of relaxation passes.
    pub const DEFAULT_RELAX_PASSES: usize = 4;
    /// Default mask coverage threshold (alpha 128 of 255).
    pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 128.0 / 255.0;
    /// Default candidate draw budget.
    pub const DEFAULT_MAX_CANDIDATES: usize = 1_000_000;
    /// Default sampling attempt budget.
    pub const DEFAULT_MAX_ATTEMPTS: usize = 8;

    /// Number of sites the sampler must produce.
    #[must_use]
    pub const fn required_sites(&self) -> usize {
        self.count.saturating_mul(self.oversample)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            count: Self::DEFAULT_COUNT,
            oversample: Self::DEFAULT_OVERSAMPLE,
            fill: Self::DEFAULT_FILL,
            relax_passes: Self::DEFAULT_RELAX_PASSES,
            coverage_threshold: Self::DEFAULT_COVERAGE_THRESHOLD,
            max_candidates: Self::DEFAULT_MAX_CANDIDATES,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Random walk parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Number of moves in the walk.
    pub steps: usize,
}

impl WalkConfig {
    /// Default path length in moves.
    pub const DEFAULT_STEPS: usize = 90;
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            steps: Self::DEFAULT_STEPS,
        }
    }
}

/// Turn-to-arc decomposition parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetourConfig {
    /// Turns below this angle (degrees) get no detour.
    pub straight_threshold_deg: f64,

    /// Turns above this angle (degrees) get a triangular loop instead of
    /// an S-curve.
    pub sharp_threshold_deg: f64,

    /// Scale applied to the perpendicular offset vector.
    pub offset_scale: f64,

    /// Angle (degrees) each outer loop point sits from the site, measured
    /// around the offset center. The two points end up twice this far
    /// apart.
    pub loop_spread_deg: f64,
}

impl DetourConfig {
    /// Default straight-turn threshold.
    pub const DEFAULT_STRAIGHT_THRESHOLD_DEG: f64 = 15.0;
    /// Default sharp-turn threshold.
    pub const DEFAULT_SHARP_THRESHOLD_DEG: f64 = 60.0;
    /// Golden-ratio conjugate.
    pub const DEFAULT_OFFSET_SCALE: f64 = 0.618;
    /// Default loop spread; the outer points end up 120 degrees apart.
    pub const DEFAULT_LOOP_SPREAD_DEG: f64 = 60.0;
}

impl Default for DetourConfig {
    fn default() -> Self {
        Self {
            straight_threshold_deg: Self::DEFAULT_STRAIGHT_THRESHOLD_DEG,
            sharp_threshold_deg: Self::DEFAULT_SHARP_THRESHOLD_DEG,
            offset_scale: Self::DEFAULT_OFFSET_SCALE,
            loop_spread_deg: Self::DEFAULT_LOOP_SPREAD_DEG,
        }
    }
}

/// Animation stepping parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorConfig {
    /// Angle swept per substep, in radians.
    pub angular_speed: f64,

    /// Maximum substeps performed per frame.
    pub substeps_per_frame: usize,
}

impl AnimatorConfig {
    /// Default angular speed.
    pub const DEFAULT_ANGULAR_SPEED: f64 = 0.05;
    /// Default per-frame substep bound.
    pub const DEFAULT_SUBSTEPS_PER_FRAME: usize = 12;
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            angular_speed: Self::DEFAULT_ANGULAR_SPEED,
            substeps_per_frame: Self::DEFAULT_SUBSTEPS_PER_FRAME,
        }
    }
}

/// Stroke color and width parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Base color of unlit strokes.
    pub shadow: Rgb,
    /// Color strokes blend towards when facing the light.
    pub plant: Rgb,
    /// Highlight color mixed in by the noise field.
    pub light: Rgb,
    /// How much of the scene background color is mixed in.
    pub env_weight: f64,
    /// Base highlight weight; the noise field adds up to the same again.
    pub light_weight: f64,
    /// Spatial frequency of the noise field.
    pub noise_scale: f64,
    /// Stroke width added at full noise.
    pub max_width: f64,
}

impl StyleConfig {
    /// Default shadow color.
    pub const DEFAULT_SHADOW: Rgb = Rgb::new(0x00, 0x25, 0x1a);
    /// Default plant color.
    pub const DEFAULT_PLANT: Rgb = Rgb::new(0x00, 0x96, 0x48);
    /// Default light color.
    pub const DEFAULT_LIGHT: Rgb = Rgb::new(0xff, 0xfa, 0xc7);
    /// Default background weight.
    pub const DEFAULT_ENV_WEIGHT: f64 = 0.3;
    /// Default highlight weight.
    pub const DEFAULT_LIGHT_WEIGHT: f64 = 0.1;
    /// Default noise frequency.
    pub const DEFAULT_NOISE_SCALE: f64 = 0.01;
    /// Default maximum added stroke width.
    pub const DEFAULT_MAX_WIDTH: f64 = 20.0;
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            shadow: Self::DEFAULT_SHADOW,
            plant: Self::DEFAULT_PLANT,
            light: Self::DEFAULT_LIGHT,
            env_weight: Self::DEFAULT_ENV_WEIGHT,
            light_weight: Self::DEFAULT_LIGHT_WEIGHT,
            noise_scale: Self::DEFAULT_NOISE_SCALE,
            max_width: Self::DEFAULT_MAX_WIDTH,
        }
    }
}

/// Configuration for one vine build and its animation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VineConfig {
    /// Point sampling.
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Random walk.
    #[serde(default)]
    pub walk: WalkConfig,
    /// Turn detours.
    #[serde(default)]
    pub detour: DetourConfig,
    /// Animation stepping.
    #[serde(default)]
    pub animator: AnimatorConfig,
    /// Stroke styling.
    #[serde(default)]
    pub style: StyleConfig,
}

impl VineConfig {
    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidConfig`] naming the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), PathError> {
        let fail = |msg: &str| Err(PathError::InvalidConfig(msg.to_owned()));
        let s = &self.sampler;
        if s.required_sites() < 3 {
            return fail("sampler needs at least 3 sites (count * oversample)");
        }
        if !(s.fill > 0.0 && s.fill <= 1.0) {
            return fail("sampler fill must be in (0, 1]");
        }
        if !(0.0..1.0).contains(&s.coverage_threshold) {
            return fail("coverage threshold must be in [0, 1)");
        }
        if s.max_attempts == 0 {
            return fail("sampler max_attempts must be positive");
        }
        if s.max_candidates < s.required_sites() {
            return fail("sampler max_candidates must cover the required sites");
        }
        if self.walk.steps == 0 {
            return fail("walk steps must be positive");
        }
        let d = &self.detour;
        if !(0.0 <= d.straight_threshold_deg && d.straight_threshold_deg <= d.sharp_threshold_deg)
        {
            return fail("detour thresholds must satisfy 0 <= straight <= sharp");
        }
        if !(d.offset_scale.is_finite() && d.loop_spread_deg.is_finite()) {
            return fail("detour offset scale and loop spread must be finite");
        }
        if !(self.animator.angular_speed > 0.0 && self.animator.angular_speed.is_finite()) {
            return fail("angular speed must be positive and finite");
        }
        if self.animator.substeps_per_frame == 0 {
            return fail("substeps per frame must be positive");
        }
        Ok(())
    }
}
