//! The host-owned drawing session: one build, its scene, and the animator
//! sweeping it.

use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;

use crate::animate::{Animator, FrameReport, Phase, Scheduler, Surface};
use crate::config::VineConfig;
use crate::mask::CoverageMask;
use crate::style::{Scene, StrokeStyler};
use crate::types::{Dimensions, PathError};
use crate::{ArcPath, build};

/// Pause between halting a drawing and starting the next one.
pub const RESTART_DELAY: Duration = Duration::from_millis(20);

/// A running vine drawing.
///
/// The host calls [`frame`](Self::frame) whenever its [`Scheduler`] fires.
/// [`restart`](Self::restart) halts the current drawing and schedules the
/// rebuild for the next frame after [`RESTART_DELAY`].
pub struct Session<R = StdRng> {
    config: VineConfig,
    dimensions: Dimensions,
    rng: R,
    mask: Option<Box<dyn CoverageMask>>,
    path: ArcPath,
    scene: Scene,
    styler: StrokeStyler,
    animator: Animator,
    generation: u64,
    pending_rebuild: bool,
    needs_begin: bool,
}

impl<R: Rng> Session<R> {
    /// Build the first drawing.
    ///
    /// # Errors
    ///
    /// Returns any [`PathError`] from [`build`].
    pub fn new(
        config: VineConfig,
        dimensions: Dimensions,
        mask: Option<Box<dyn CoverageMask>>,
        mut rng: R,
    ) -> Result<Self, PathError> {
        let path = build(&config, dimensions, mask.as_deref(), &mut rng)?;
        let scene = Scene::random(&mut rng);
        let styler = StrokeStyler::new(config.style.clone(), &scene);
        let animator = Animator::new(config.animator.clone());
        Ok(Self {
            config,
            dimensions,
            rng,
            mask,
            path,
            scene,
            styler,
            animator,
            generation: 0,
            pending_rebuild: false,
            needs_begin: true,
        })
    }

    /// The current build.
    #[must_use]
    pub const fn path(&self) -> &ArcPath {
        &self.path
    }

    /// The current scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The animator.
    #[must_use]
    pub const fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &VineConfig {
        &self.config
    }

    /// Surface size.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Number of rebuilds since the session was created.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the current drawing still has chords to draw.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.pending_rebuild && self.animator.phase() != Phase::Finished
    }

    /// Draw one frame.
    ///
    /// Performs a pending rebuild first. The surface's
    /// [`begin`](Surface::begin) is called before the first chord of
    /// every drawing.
    ///
    /// # Errors
    ///
    /// Returns any [`PathError`] from a pending rebuild.
    pub fn frame(
        &mut self,
        surface: &mut dyn Surface,
        scheduler: &mut dyn Scheduler,
    ) -> Result<FrameReport, PathError> {
        if self.pending_rebuild {
            self.rebuild()?;
        }
        if self.needs_begin {
            surface.begin(&self.scene);
            self.needs_begin = false;
        }
        let styler = &self.styler;
        Ok(self.animator.frame(
            &self.path.arcs,
            |chord| surface.draw(&styler.instruction(chord)),
            scheduler,
        ))
    }

    /// Stop the current drawing. No more chords are drawn until a rebuild.
    pub const fn halt(&mut self) {
        self.animator.halt();
    }

    /// Halt now and ask for the rebuild to happen on the next frame after
    /// [`RESTART_DELAY`].
    pub fn restart(&mut self, scheduler: &mut dyn Scheduler) {
        self.halt();
        self.pending_rebuild = true;
        tracing::info!(generation = self.generation, "restart requested");
        scheduler.request_frame_after(RESTART_DELAY);
    }

    /// Replace the drawing immediately with a fresh build and scene.
    ///
    /// # Errors
    ///
    /// Returns any [`PathError`] from [`build`]. The previous drawing stays
    /// halted in that case.
    pub fn rebuild(&mut self) -> Result<(), PathError> {
        self.pending_rebuild = false;
        self.animator.halt();
        self.path = build(
            &self.config,
            self.dimensions,
            self.mask.as_deref(),
            &mut self.rng,
        )?;
        self.scene = Scene::random(&mut self.rng);
        self.styler = StrokeStyler::new(self.config.style.clone(), &self.scene);
        self.animator.reset();
        self.generation += 1;
        self.needs_begin = true;
        tracing::debug!(
            generation = self.generation,
            palette = %self.scene.palette,
            "rebuilt"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::animate::DrawInstruction;

    #[derive(Default)]
    struct RecordingScheduler {
        frames: usize,
        delays: Vec<Duration>,
    }

    impl Scheduler for RecordingScheduler {
        fn request_frame(&mut self) {
            self.frames += 1;
        }

        fn request_frame_after(&mut self, delay: Duration) {
            self.delays.push(delay);
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        begins: Vec<Scene>,
        draws: Vec<DrawInstruction>,
    }

    impl Surface for RecordingSurface {
        fn begin(&mut self, scene: &Scene) {
            self.begins.push(scene.clone());
        }

        fn draw(&mut self, instruction: &DrawInstruction) {
            self.draws.push(*instruction);
        }
    }

    fn session(seed: u64) -> Session {
        let mut config = VineConfig::default();
        config.walk.steps = 12;
        Session::new(
            config,
            Dimensions::new(400, 300),
            None,
            StdRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    #[test]
    fn runs_to_completion() {
        let mut session = session(51);
        let mut surface = RecordingSurface::default();
        let mut scheduler = RecordingScheduler::default();
        let expected = session
            .path()
            .total_substeps(session.config().animator.angular_speed);
        while session
            .frame(&mut surface, &mut scheduler)
            .unwrap()
            .requested
        {}
        assert_eq!(surface.draws.len() as u64, expected);
        assert!(scheduler.frames > 0);
        assert_eq!(surface.begins.len(), 1);
        assert_eq!(surface.begins[0], *session.scene());
        assert_eq!(session.animator().phase(), Phase::Finished);
        assert!(!session.is_running());
    }

    #[test]
    fn restart_halts_then_rebuilds_on_next_frame() {
        let mut session = session(52);
        let mut surface = RecordingSurface::default();
        let mut scheduler = RecordingScheduler::default();
        session.frame(&mut surface, &mut scheduler).unwrap();
        assert!(session.is_running());

        session.restart(&mut scheduler);
        assert_eq!(scheduler.delays, vec![RESTART_DELAY]);
        assert_eq!(session.animator().phase(), Phase::Finished);
        assert_eq!(session.generation(), 0);
        let drawn_before = surface.draws.len();

        let report = session.frame(&mut surface, &mut scheduler).unwrap();
        assert_eq!(session.generation(), 1);
        assert_eq!(surface.begins.len(), 2);
        assert!(report.chords > 0);
        assert_eq!(surface.draws.len(), drawn_before + report.chords);
    }

    #[test]
    fn halted_session_draws_nothing() {
        let mut session = session(53);
        let mut draws: Vec<DrawInstruction> = Vec::new();
        let mut scheduler = RecordingScheduler::default();
        session.halt();
        let report = session.frame(&mut draws, &mut scheduler).unwrap();
        assert_eq!(report.chords, 0);
        assert!(!report.requested);
        assert!(draws.is_empty());
    }

    #[test]
    fn rebuild_replaces_path() {
        let mut session = session(54);
        let first = session.path().sites.clone();
        session.rebuild().unwrap();
        assert_eq!(session.generation(), 1);
        assert_ne!(session.path().sites, first);
        assert_eq!(session.animator().phase(), Phase::Idle);
    }
}
