//! The particle field, running as the terminal's backdrop.

use std::sync::Arc;

use color_eyre::eyre::Result;
use particle_field::backdrop::Backdrop as ParticleBackdrop;
use particle_field::color_mode::{ColorModeSource as _, SharedColorMode};
use particle_field::frame_loop::FrameRequest;
use particle_field::Vec2;

use crate::pixel_canvas::PixelCanvas;
use crate::shared_state::SharedState;

/// The particle backdrop task.
pub(crate) struct Backdrop {
    /// The base drawing struct
    layer: super::layer::Layer,
    /// The particles, the pointer and the frame loop.
    particles: ParticleBackdrop<SharedColorMode>,
    /// Where the particles are drawn.
    canvas: PixelCanvas,
    /// The custom cursor.
    cursor: super::cursor::Config,
    /// Shared app state
    state: Arc<SharedState>,
}

impl Backdrop {
    /// Instantiate
    async fn new(
        output_channel: tokio::sync::mpsc::Sender<crate::run::FrameUpdate>,
        state: Arc<SharedState>,
    ) -> Self {
        let config = state.config.read().await.clone();
        let mut layer = super::layer::Layer::new("backdrop".to_owned(), output_channel);
        let tty_size = state.get_tty_size().await;
        layer.set_tty_size(tty_size.width, tty_size.height);

        let colour_source = state.color_mode.clone();
        let paper = state.color_mode.current().paper();
        let mut particles =
            ParticleBackdrop::new(config.particles, colour_source, config.frame_rate);
        particles.set_attraction_enabled(state.get_is_attraction_enabled().await);

        Self {
            layer,
            particles,
            canvas: PixelCanvas::new(config.scale, paper),
            cursor: config.cursor,
            state,
        }
    }

    /// Our main entrypoint.
    pub(crate) fn start(
        output: tokio::sync::mpsc::Sender<crate::run::FrameUpdate>,
        state: Arc<SharedState>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move {
            let protocol_tx = state.protocol_tx.clone();
            let result = Self::run(output, state).await;
            if let Err(error) = &result {
                tracing::error!("Backdrop error: {error:?}");
                crate::run::broadcast_protocol_end(&protocol_tx);
            }
            result
        })
    }

    /// Mount, then step the particles until the app ends.
    async fn run(
        output: tokio::sync::mpsc::Sender<crate::run::FrameUpdate>,
        state: Arc<SharedState>,
    ) -> Result<()> {
        let mut protocol = state.protocol_tx.subscribe();
        let mut backdrop = Self::new(output, state).await;
        backdrop.mount();

        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                request = backdrop.particles.frame_loop.next_frame() => {
                    backdrop.frame(request).await?;
                },
                Ok(message) = protocol.recv() => {
                    if matches!(message, crate::run::Protocol::End) {
                        break;
                    }
                    backdrop.handle_protocol_message(message).await;
                }
            }
        }

        backdrop.particles.unmount();
        tracing::debug!("Leaving backdrop loop");
        Ok(())
    }

    /// The viewport in surface units.
    fn viewport(&self) -> (f32, f32) {
        let (width, height) = self.layer.pixel_dimensions();
        let scale = self.canvas.scale();
        (width * scale, height * scale)
    }

    /// Seed the particles and start the frame loop.
    fn mount(&mut self) {
        let (width, height) = self.viewport();
        if self.particles.mount(&mut self.canvas, width, height).is_some() {
            tracing::debug!("Backdrop mounted with viewport {width}x{height}");
        }
    }

    /// Reseed the particles for the current viewport.
    fn resize(&mut self) {
        let (width, height) = self.viewport();
        self.particles.resize(&mut self.canvas, width, height);
    }

    /// Render a single frame and send it to the renderer.
    async fn frame(&mut self, request: FrameRequest) -> Result<()> {
        let mode = self.particles.color_mode();
        self.canvas.set_paper(mode.paper());
        if !self.particles.frame(request, Some(&mut self.canvas)) {
            return Ok(());
        }

        let (width, _) = self.viewport();
        self.cursor
            .draw(&mut self.canvas, &self.particles.pointer, width, mode);

        self.layer.initialise_surface();
        self.canvas.flush(&mut self.layer.surface)?;
        self.layer.send_output().await
    }

    /// Handle messages from the global protocol.
    async fn handle_protocol_message(&mut self, message: crate::run::Protocol) {
        if self.layer.handle_common_protocol_messages(&message) {
            self.resize();
            return;
        }

        #[expect(clippy::wildcard_enum_match_arm, reason = "It's our internal protocol")]
        match message {
            crate::run::Protocol::Input(input) => {
                if let termwiz::input::InputEvent::Mouse(mouse) = input.event {
                    self.handle_mouse(&mouse);
                }
            }
            crate::run::Protocol::Config(config) => self.reconfigure(config).await,
            crate::run::Protocol::AttractionChanged(is_enabled) => {
                self.particles.set_attraction_enabled(is_enabled);
            }
            crate::run::Protocol::ColorModeChanged(mode) => {
                tracing::debug!("Repainting backdrop paper for {mode} mode");
                self.canvas.set_paper(mode.paper());
                particle_field::canvas::Canvas::clear(&mut self.canvas);
            }
            _ => (),
        }
    }

    /// Feed mouse events to the pointer state.
    fn handle_mouse(&mut self, mouse: &termwiz::input::MouseEvent) {
        let position = pointer_position(mouse.x, mouse.y, self.canvas.scale());
        self.particles.pointer_moved(position);

        let buttons = termwiz::input::MouseButtons::LEFT
            | termwiz::input::MouseButtons::RIGHT
            | termwiz::input::MouseButtons::MIDDLE;
        let is_pressed = mouse.mouse_buttons.intersects(buttons);
        if is_pressed && !self.particles.pointer.is_pressed {
            self.particles.pointer_down();
        }
        if !is_pressed && self.particles.pointer.is_pressed {
            self.particles.pointer_up();
        }
    }

    /// Apply a reloaded config.
    async fn reconfigure(&mut self, config: crate::config::main::Config) {
        self.particles.frame_loop.set_frame_rate(config.frame_rate);
        self.particles
            .set_attraction_enabled(self.state.get_is_attraction_enabled().await);
        self.cursor = config.cursor;

        #[expect(clippy::float_cmp, reason = "Any change at all means a reseed")]
        let is_rescaled = config.scale != self.canvas.scale();
        if is_rescaled {
            self.canvas.set_scale(config.scale);
            self.particles.field.config = config.particles;
            self.resize();
        } else if config.particles != self.particles.field.config {
            self.particles.reconfigure(&mut self.canvas, config.particles);
        }
    }
}

/// Convert a terminal mouse position to surface units. Mouse reports are 1-based and point at a
/// whole cell, so the centre of the cell is used.
fn pointer_position(x: u16, y: u16, scale: f32) -> Vec2 {
    let column = f32::from(x.saturating_sub(1));
    let row = f32::from(y.saturating_sub(1));
    Vec2::new((column + 0.5) * scale, row.mul_add(2.0, 1.0) * scale)
}
