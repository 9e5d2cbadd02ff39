//! Frame-stepped arc animation.
//!
//! The [`Animator`] sweeps each arc at a fixed angular speed, one chord per
//! substep, and never does more than `substeps_per_frame` substeps per
//! [`frame`](Animator::frame). The host owns the clock: it implements
//! [`Scheduler`] and calls `frame` again whenever a frame was requested.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::angle::wrap;
use crate::arc::Arc;
use crate::color::Rgb;
use crate::config::AnimatorConfig;
use crate::style::Scene;
use crate::types::Point;

// ---------------------------------------------------------------------------
// Host interfaces
// ---------------------------------------------------------------------------

/// Host frame clock.
pub trait Scheduler {
    /// Ask for [`Animator::frame`] to be called again on the next frame.
    fn request_frame(&mut self);

    /// Ask for a frame once `delay` has passed.
    ///
    /// Hosts without timers may ignore the delay.
    fn request_frame_after(&mut self, _delay: Duration) {
        self.request_frame();
    }
}

/// Drawing target for styled chords.
pub trait Surface {
    /// Prepare for a new drawing, typically by painting the scene
    /// background.
    fn begin(&mut self, _scene: &Scene) {}

    /// Stroke one chord.
    fn draw(&mut self, instruction: &DrawInstruction);
}

/// A single styled line segment, in animation order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    /// Start x.
    pub x0: f64,
    /// Start y.
    pub y0: f64,
    /// End x.
    pub x1: f64,
    /// End y.
    pub y1: f64,
    /// Stroke color.
    pub stroke: Rgb,
    /// Stroke width in pixels.
    pub width: f64,
    /// Whether the chord belongs to a revisit arc.
    pub background: bool,
}

/// Collects instructions; used by tests and by the SVG export.
impl Surface for Vec<DrawInstruction> {
    fn draw(&mut self, instruction: &DrawInstruction) {
        self.push(*instruction);
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Animator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not started.
    #[default]
    Idle,
    /// Drawing.
    Running,
    /// Every arc has been drawn, or the animation was halted.
    Finished,
}

/// Position of the animation within the arc list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationState {
    /// Arc being drawn; `None` before the first arc is loaded.
    pub arc_index: Option<usize>,
    /// Chords left to draw on the current arc.
    pub remaining_substeps: u32,
    /// Unwrapped angle of the next chord's start.
    pub angle: f64,
    /// Signed angle advanced per substep.
    pub angular_step: f64,
    /// Lifecycle phase.
    pub phase: Phase,
}

/// One unstyled chord of an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    /// Index of the arc this chord belongs to.
    pub arc_index: usize,
    /// Wrapped start angle.
    pub start_angle: f64,
    /// Wrapped end angle.
    pub end_angle: f64,
    /// Start point on the arc's circle.
    pub from: Point,
    /// End point on the arc's circle.
    pub to: Point,
    /// Copied from the arc.
    pub background: bool,
}

impl Chord {
    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.from.midpoint(self.to)
    }
}

/// Outcome of one [`Animator::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// A chord was produced.
    Chord(Chord),
    /// Nothing left to draw.
    Finished,
}

/// Summary of one [`Animator::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Chords drawn during the frame.
    pub chords: usize,
    /// Phase after the frame.
    pub phase: Phase,
    /// Whether another frame was requested from the scheduler.
    pub requested: bool,
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// Arc sweeping state machine.
#[derive(Debug, Clone)]
pub struct Animator {
    config: AnimatorConfig,
    state: AnimationState,
}

impl Animator {
    /// A new, idle animator.
    #[must_use]
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            state: AnimationState::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Whether the animation has started and not yet finished.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    /// Stop drawing. Further ticks and frames do nothing until
    /// [`reset`](Self::reset).
    pub const fn halt(&mut self) {
        self.state.phase = Phase::Finished;
    }

    /// Return to [`Phase::Idle`] before the first arc.
    pub fn reset(&mut self) {
        self.state = AnimationState::default();
    }

    /// Advance by one substep.
    ///
    /// Arcs whose sweep is shorter than one substep draw nothing and are
    /// passed over. The last chord of an arc ends exactly on its
    /// `end_angle`.
    pub fn tick(&mut self, arcs: &[Arc]) -> Tick {
        match self.state.phase {
            Phase::Finished => return Tick::Finished,
            Phase::Idle => self.state.phase = Phase::Running,
            Phase::Running => {}
        }

        let speed = self.config.angular_speed;
        while self.state.remaining_substeps == 0 {
            let next = self.state.arc_index.map_or(0, |i| i + 1);
            let Some(arc) = arcs.get(next) else {
                self.state.phase = Phase::Finished;
                return Tick::Finished;
            };
            self.state.arc_index = Some(next);
            self.state.angle = arc.start_angle;
            self.state.angular_step = if arc.clockwise { -speed } else { speed };
            self.state.remaining_substeps = arc.substeps(speed);
        }

        let Some((index, arc)) = self
            .state
            .arc_index
            .and_then(|i| arcs.get(i).map(|arc| (i, arc)))
        else {
            self.state.phase = Phase::Finished;
            return Tick::Finished;
        };

        let from = self.state.angle;
        self.state.angle += self.state.angular_step;
        self.state.remaining_substeps -= 1;
        let to = if self.state.remaining_substeps == 0 {
            arc.end_angle
        } else {
            self.state.angle
        };

        if self.state.remaining_substeps == 0 && index + 1 == arcs.len() {
            self.state.phase = Phase::Finished;
        }

        let (start_angle, end_angle) = (wrap(from), wrap(to));
        Tick::Chord(Chord {
            arc_index: index,
            start_angle,
            end_angle,
            from: arc.point_at(start_angle),
            to: arc.point_at(end_angle),
            background: arc.background,
        })
    }

    /// Run up to `substeps_per_frame` ticks, handing each chord to `emit`,
    /// then request another frame if still running.
    pub fn frame<F>(
        &mut self,
        arcs: &[Arc],
        mut emit: F,
        scheduler: &mut dyn Scheduler,
    ) -> FrameReport
    where
        F: FnMut(&Chord),
    {
        let mut chords = 0;
        for _ in 0..self.config.substeps_per_frame {
            match self.tick(arcs) {
                Tick::Chord(chord) => {
                    emit(&chord);
                    chords += 1;
                }
                Tick::Finished => break,
            }
            if self.state.phase == Phase::Finished {
                break;
            }
        }

        let requested = self.is_running();
        if requested {
            scheduler.request_frame();
        }
        FrameReport {
            chords,
            phase: self.state.phase,
            requested,
        }
    }
}
