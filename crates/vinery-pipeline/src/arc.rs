//! Turn-to-arc decomposition.
//!
//! Every move becomes a half-circle arc from its start site to its end
//! site. Where the path turns, a detour is inserted at the turning site
//! first: a two-arc S-curve for moderate turns, a three-arc loop for sharp
//! ones. Arc handedness (chirality) alternates from move to move, and a
//! loop flips it once more.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::angle::degrees;
use crate::config::DetourConfig;
use crate::types::{GeometryError, Point};
use crate::walk::Move;

/// A circular arc between two points, drawn as a half circle over their
/// midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    /// Circle center.
    pub center: Point,
    /// Circle radius.
    pub radius: f64,
    /// Angle (radians) of the arc's first point as seen from `center`.
    pub start_angle: f64,
    /// Angle (radians) of the arc's last point as seen from `center`.
    pub end_angle: f64,
    /// Sweep direction; clockwise arcs step towards smaller angles.
    pub clockwise: bool,
    /// Drawn as background (the owning move was a revisit).
    pub background: bool,
}

impl Arc {
    /// The arc from `from` to `to` on the circle having them as diameter.
    #[must_use]
    pub fn between(from: Point, to: Point, clockwise: bool, background: bool) -> Self {
        let center = from.midpoint(to);
        Self {
            center,
            radius: from.distance(to) / 2.0,
            start_angle: (from.y - center.y).atan2(from.x - center.x),
            end_angle: (to.y - center.y).atan2(to.x - center.x),
            clockwise,
            background,
        }
    }

    /// Point on the arc's circle at `angle`.
    #[must_use]
    pub fn point_at(&self, angle: f64) -> Point {
        Point::new(
            self.radius.mul_add(angle.cos(), self.center.x),
            self.radius.mul_add(angle.sin(), self.center.y),
        )
    }

    /// Number of chords the animator draws for this arc at `speed`
    /// radians per substep: `floor(|end - start| / speed)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn substeps(&self, speed: f64) -> u32 {
        let n = ((self.end_angle - self.start_angle).abs() / speed).floor();
        if n.is_finite() && n > 0.0 {
            n.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }
}

/// How a turn is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// No detour.
    Straight,
    /// Two-arc S-curve through an offset point.
    Moderate,
    /// Three-arc loop, followed by a chirality flip.
    Sharp,
}

/// The deflection at `site` when walking `prev -> site -> next`, in
/// `[0, π]`: zero for a straight continuation, π for a full reversal.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] if `site` coincides with
/// either neighbor.
pub fn turn_angle(prev: Point, site: Point, next: Point) -> Result<f64, GeometryError> {
    let (ax, ay) = (prev.x - site.x, prev.y - site.y);
    let (bx, by) = (next.x - site.x, next.y - site.y);
    let norms = ax.hypot(ay) * bx.hypot(by);
    if norms <= 0.0 || !norms.is_finite() {
        return Err(GeometryError::InvalidGeometry);
    }
    let cos = (ax.mul_add(bx, ay * by) / norms).clamp(-1.0, 1.0);
    Ok(TAU / 2.0 - cos.acos())
}

/// Classify a turn angle (radians) against the detour thresholds.
///
/// Both boundaries are inclusive on the detour side: a turn of exactly
/// the straight threshold is moderate, exactly the sharp threshold is
/// still moderate.
#[must_use]
pub fn classify_turn(turn: f64, detour: &DetourConfig) -> TurnKind {
    if turn < degrees(detour.straight_threshold_deg) {
        TurnKind::Straight
    } else if turn <= degrees(detour.sharp_threshold_deg) {
        TurnKind::Moderate
    } else {
        TurnKind::Sharp
    }
}

/// Incremental builder that turns moves into arcs while tracking
/// chirality and the previous path point.
#[derive(Debug, Clone)]
pub struct ArcPathBuilder {
    detour: DetourConfig,
    clockwise: bool,
    prev: Option<Point>,
    arcs: Vec<Arc>,
}

impl ArcPathBuilder {
    /// A builder with clockwise chirality and no previous point.
    #[must_use]
    pub const fn new(detour: DetourConfig) -> Self {
        Self {
            detour,
            clockwise: true,
            prev: None,
            arcs: Vec::new(),
        }
    }

    /// Current chirality.
    #[must_use]
    pub const fn clockwise(&self) -> bool {
        self.clockwise
    }

    /// Arcs emitted so far.
    #[must_use]
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Append the arcs for one move and return how many were added.
    pub fn push(&mut self, step: &Move) -> usize {
        let before = self.arcs.len();
        let site = step.from.point;
        let next = step.to.point;
        let bg = step.revisit;

        if let Some(prev) = self.prev {
            match turn_angle(prev, site, next) {
                Ok(turn) => {
                    self.push_detour(classify_turn(turn, &self.detour), prev, site, next, bg);
                }
                Err(err) => tracing::warn!(
                    site = ?step.from.id,
                    %err,
                    "skipping detour"
                ),
            }
        }

        self.arcs.push(Arc::between(site, next, self.clockwise, bg));
        self.clockwise = !self.clockwise;
        self.prev = Some(site);
        self.arcs.len() - before
    }

    /// Consume the builder, returning the arc list.
    #[must_use]
    pub fn finish(self) -> Vec<Arc> {
        self.arcs
    }

    fn push_detour(&mut self, kind: TurnKind, prev: Point, site: Point, next: Point, bg: bool) {
        let (dx, dy) = self.offset(prev, site, next);
        let cw = self.clockwise;
        match kind {
            TurnKind::Straight => {}
            TurnKind::Moderate => {
                let bulge = Point::new(site.x + dx, site.y + dy);
                self.arcs.push(Arc::between(site, bulge, cw, bg));
                self.arcs.push(Arc::between(bulge, site, cw, bg));
            }
            TurnKind::Sharp => {
                let dist = dx.hypot(dy);
                let phi = (-dy).atan2(-dx);
                let spread = degrees(self.detour.loop_spread_deg);
                let tip = |a: f64| {
                    Point::new(
                        dist.mul_add(a.cos(), site.x + dx),
                        dist.mul_add(a.sin(), site.y + dy),
                    )
                };
                let p4 = tip(phi - spread);
                let p5 = tip(phi + spread);
                self.arcs.push(Arc::between(site, p4, cw, bg));
                self.arcs.push(Arc::between(p4, p5, cw, bg));
                self.arcs.push(Arc::between(p5, site, cw, bg));
                self.clockwise = !self.clockwise;
            }
        }
    }

    /// Offset perpendicular to `site - midpoint(prev, next)`, on the side
    /// given by chirality, scaled by the configured factor.
    fn offset(&self, prev: Point, site: Point, next: Point) -> (f64, f64) {
        let m = prev.midpoint(next);
        let (dx, dy) = if self.clockwise {
            (site.y - m.y, -(site.x - m.x))
        } else {
            (-(site.y - m.y), site.x - m.x)
        };
        let k = self.detour.offset_scale;
        (dx * k, dy * k)
    }
}

/// Build the arc list for a whole walk.
#[must_use]
pub fn build_arcs(moves: &[Move], detour: &DetourConfig) -> Vec<Arc> {
    let mut builder = ArcPathBuilder::new(detour.clone());
    for step in moves {
        builder.push(step);
    }
    builder.finish()
}
