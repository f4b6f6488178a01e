//! Everything a host needs to run the particle field: the field itself, the pointer, the colour
//! mode and the frame loop.
//!
//! All the methods here are meant to be called from callbacks that never run concurrently with
//! each other, eg the arms of a single `tokio::select!` loop. So no locking is needed.

use glam::Vec2;
use rand::SeedableRng as _;

use crate::canvas::Canvas;
use crate::color_mode::{ColorMode, ColorModeSource};
use crate::config::Config;
use crate::field::ParticleField;
use crate::frame_loop::{FrameLoop, FrameRequest};
use crate::pointer::Pointer;

/// The animated particle backdrop.
#[derive(Debug)]
#[non_exhaustive]
pub struct Backdrop<S: ColorModeSource> {
    /// The particles.
    pub field: ParticleField,
    /// The last known pointer state.
    pub pointer: Pointer,
    /// The scheduler of frames.
    pub frame_loop: FrameLoop,
    /// Where the current colour mode is read from.
    colour_source: S,
    /// Randomness for seeding particles.
    rng: rand::rngs::StdRng,
}

impl<S: ColorModeSource> Backdrop<S> {
    /// Instantiate. Nothing happens until it's mounted.
    #[must_use]
    pub fn new(config: Config, colour_source: S, frame_rate: u32) -> Self {
        Self {
            field: ParticleField::new(config),
            pointer: Pointer::default(),
            frame_loop: FrameLoop::new(frame_rate),
            colour_source,
            rng: rand::rngs::StdRng::from_entropy(),
        }
    }

    /// Use a specific random number generator, so that seeding is reproducible.
    #[must_use]
    pub fn with_rng(mut self, rng: rand::rngs::StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// The colour mode as it is right now.
    pub fn color_mode(&self) -> ColorMode {
        self.colour_source.current()
    }

    /// Seed the field for the current viewport and start producing frames.
    pub fn mount<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        width: f32,
        height: f32,
    ) -> Option<FrameRequest> {
        self.resize(canvas, width, height);
        self.frame_loop.start()
    }

    /// Stop producing frames. Any frame already scheduled is cancelled.
    pub fn unmount(&mut self) {
        self.frame_loop.stop();
    }

    /// The viewport changed size, so replace all the particles.
    pub fn resize<C: Canvas + ?Sized>(&mut self, canvas: &mut C, width: f32, height: f32) {
        let mode = self.color_mode();
        self.field.reseed(canvas, width, height, mode, &mut self.rng);
    }

    /// Use new simulation constants. The field is reseeded because the particle count may have
    /// changed.
    pub fn reconfigure<C: Canvas + ?Sized>(&mut self, canvas: &mut C, config: Config) {
        self.field.config = config;
        let (width, height) = (self.field.width, self.field.height);
        self.resize(canvas, width, height);
    }

    /// The pointer moved.
    pub fn pointer_moved(&mut self, position: Vec2) {
        let viewport = self.field.viewport();
        self.pointer
            .moved(position, viewport, self.field.config.parallax_strength);
    }

    /// A pointer button was pressed.
    pub const fn pointer_down(&mut self) {
        self.pointer.is_pressed = true;
    }

    /// A pointer button was released.
    pub const fn pointer_up(&mut self) {
        self.pointer.is_pressed = false;
    }

    /// Switch the pull of the pointer on or off.
    pub const fn set_attraction_enabled(&mut self, is_enabled: bool) {
        self.pointer.is_attraction_enabled = is_enabled;
    }

    /// Run a due frame and schedule the next one. Returns whether anything was drawn.
    ///
    /// Frames for a stopped loop, or stale frames, do nothing at all.
    pub fn frame<C: Canvas + ?Sized>(
        &mut self,
        request: FrameRequest,
        canvas: Option<&mut C>,
    ) -> bool {
        if !self.frame_loop.fire(request) {
            return false;
        }

        let is_drawn = self.step(canvas);
        self.frame_loop.schedule();
        is_drawn
    }

    /// A single step of the simulation. Without a canvas, or with an empty viewport, nothing
    /// changes.
    pub fn step<C: Canvas + ?Sized>(&mut self, canvas: Option<&mut C>) -> bool {
        let Some(canvas) = canvas else {
            return false;
        };
        if !self.field.is_ready() {
            return false;
        }

        let mode = self.color_mode();
        self.field.step(canvas, &self.pointer, mode);
        true
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng as _;

    use super::*;
    use crate::tests::helpers::RecordingCanvas;

    fn backdrop() -> Backdrop<ColorMode> {
        Backdrop::new(Config::default(), ColorMode::Dark, 30)
            .with_rng(rand::rngs::StdRng::seed_from_u64(1))
    }

    #[test]
    fn mount_seeds_and_starts() {
        let mut backdrop = backdrop();
        let mut canvas = RecordingCanvas::default();
        let request = backdrop.mount(&mut canvas, 300.0, 200.0).unwrap();
        assert_eq!(backdrop.field.particles.len(), 6);

        assert!(backdrop.frame(request, Some(&mut canvas)));
        assert_eq!(canvas.circles().len(), 6);
        assert!(backdrop.frame_loop.pending().is_some());
    }

    #[test]
    fn missing_canvas_changes_nothing() {
        let mut backdrop = backdrop();
        let mut canvas = RecordingCanvas::default();
        let request = backdrop.mount(&mut canvas, 300.0, 200.0).unwrap();
        let before = backdrop.field.particles.clone();

        assert!(!backdrop.frame::<RecordingCanvas>(request, None));
        assert_eq!(backdrop.field.particles, before);

        let next = backdrop.frame_loop.pending().unwrap();
        assert!(backdrop.frame(next, Some(&mut canvas)));
    }

    #[test]
    fn unmount_cancels_pending_frame() {
        let mut backdrop = backdrop();
        let mut canvas = RecordingCanvas::default();
        let request = backdrop.mount(&mut canvas, 300.0, 200.0).unwrap();
        backdrop.unmount();

        let draws = canvas.draw_count();
        assert!(!backdrop.frame(request, Some(&mut canvas)));
        assert_eq!(canvas.draw_count(), draws);
    }

    #[test]
    fn pointer_handlers_update_state() {
        let mut backdrop = backdrop();
        let mut canvas = RecordingCanvas::default();
        backdrop.mount(&mut canvas, 200.0, 100.0);

        backdrop.pointer_moved(Vec2::new(200.0, 0.0));
        assert_eq!(backdrop.pointer.parallax_offset, Vec2::new(-25.0, 25.0));

        backdrop.pointer_down();
        assert!(!backdrop.pointer.is_attracting());
        backdrop.set_attraction_enabled(true);
        assert!(backdrop.pointer.is_attracting());
        backdrop.pointer_up();
        assert!(!backdrop.pointer.is_attracting());
    }

    #[test]
    fn reconfigure_reseeds() {
        let mut backdrop = backdrop();
        let mut canvas = RecordingCanvas::default();
        backdrop.mount(&mut canvas, 1800.0, 1000.0);
        assert_eq!(backdrop.field.particles.len(), 120);

        let config = Config {
            max_particles: 10,
            ..Config::default()
        };
        backdrop.reconfigure(&mut canvas, config);
        assert_eq!(backdrop.field.particles.len(), 10);
    }
}
