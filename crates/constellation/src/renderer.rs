//! Render the backdrop to the user's terminal

use std::io::Write as _;
use std::sync::Arc;

use color_eyre::eyre::{ContextCompat as _, Result};
use particle_field::color_mode::{ColorMode, ColorModeSource as _};
use termwiz::cell::Cell;
use tokio::sync::mpsc;

use termwiz::surface::Change as TermwizChange;
use termwiz::surface::Position as TermwizPosition;
use termwiz::surface::Surface as TermwizSurface;
use termwiz::terminal::buffered::BufferedTerminal;
use termwiz::terminal::{ScreenSize, Terminal as TermwizTerminal};

use crate::run::FrameUpdate;
use crate::shared_state::SharedState;

/// `Render`
pub(crate) struct Renderer {
    /// Shared app state
    pub state: Arc<SharedState>,
    /// The terminal's width
    pub width: u16,
    /// The terminal's height
    pub height: u16,
    /// The latest frame of the backdrop
    pub backdrop: TermwizSurface,
}

impl Renderer {
    /// Create a renderer to render to a user's terminal
    pub fn new(state: Arc<SharedState>) -> Result<Self> {
        let mut renderer = Self {
            state,
            width: Default::default(),
            height: Default::default(),
            backdrop: TermwizSurface::default(),
        };

        let size = Self::get_users_tty_size()?;
        renderer.width = size.cols.try_into()?;
        renderer.height = size.rows.try_into()?;

        Ok(renderer)
    }

    /// Instantiate and run
    pub fn start(
        state: Arc<SharedState>,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> (
        tokio::task::JoinHandle<Result<()>>,
        mpsc::Sender<FrameUpdate>,
    ) {
        let (surfaces_tx, surfaces_rx) = mpsc::channel(8);
        let protocol_rx = protocol_tx.subscribe();
        let handle = tokio::spawn(async move {
            // Any error must still end the whole app, so that the user's terminal is restored.
            match Self::new(Arc::clone(&state)) {
                Ok(mut renderer) => {
                    let result = renderer
                        .run(surfaces_rx, protocol_rx, protocol_tx.clone())
                        .await;

                    if let Err(error) = result {
                        crate::run::broadcast_protocol_end(&protocol_tx);
                        return Err(error);
                    };
                }
                Err(error) => {
                    crate::run::broadcast_protocol_end(&protocol_tx);
                    return Err(error);
                }
            };

            Ok(())
        });

        (handle, surfaces_tx)
    }

    /// `BufferedTerminal::new()` needs a concrete `Terminal`.
    fn get_termwiz_terminal() -> Result<impl TermwizTerminal> {
        let capabilities = termwiz::caps::Capabilities::new_from_env()?;
        Ok(termwiz::terminal::new_terminal(capabilities)?)
    }

    /// Just for initialisation
    pub fn get_users_tty_size() -> Result<ScreenSize> {
        let mut terminal = Self::get_termwiz_terminal()?;
        Ok(terminal.get_screen_size()?)
    }

    /// Get the user's current terminal size and propagate it
    pub async fn handle_resize<T: TermwizTerminal + Send>(
        &mut self,
        composited_terminal: &mut BufferedTerminal<T>,
        protocol_tx: &tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<()> {
        let is_resized = composited_terminal.check_for_resize()?;
        if !is_resized {
            return Ok(());
        }

        composited_terminal.repaint()?;

        let (width, height) = composited_terminal.dimensions();
        self.width = width.try_into()?;
        self.height = height.try_into()?;
        tracing::debug!("User's terminal resized to {}x{}", self.width, self.height);
        self.state.set_tty_size(self.width, self.height).await;
        protocol_tx.send(crate::run::Protocol::Resize {
            width: self.width,
            height: self.height,
        })?;

        Ok(())
    }

    /// Turn mouse reporting on or off. `termwiz` has no `Change` for this, so the escape codes
    /// are written straight to STDOUT.
    fn set_mouse_reporting(is_enabled: bool) -> Result<()> {
        let codes = if is_enabled {
            crate::utils::ENABLE_MOUSE_REPORTING
        } else {
            crate::utils::DISABLE_MOUSE_REPORTING
        };
        let mut stdout = std::io::stdout();
        stdout.write_all(codes.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Listen for backdrop frames.
    /// It lives in its own method so that we can catch any errors and ensure that the user's
    /// terminal is always returned to cooked mode.
    async fn run(
        &mut self,
        mut surfaces: mpsc::Receiver<FrameUpdate>,
        mut protocol_rx: tokio::sync::broadcast::Receiver<crate::run::Protocol>,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<()> {
        tracing::debug!("Putting user's terminal into raw mode");
        let mut copy_of_users_terminal = Self::get_termwiz_terminal()?;
        copy_of_users_terminal.set_raw_mode()?;
        let mut composited_terminal = BufferedTerminal::new(copy_of_users_terminal)?;
        Self::cursor_visibility(&mut composited_terminal, false)?;
        Self::set_mouse_reporting(true)?;

        let result = self
            .render_loop(
                &mut surfaces,
                &mut protocol_rx,
                &protocol_tx,
                &mut composited_terminal,
            )
            .await;

        tracing::debug!("Setting user's terminal to cooked mode");
        Self::set_mouse_reporting(false)?;
        Self::cursor_visibility(&mut composited_terminal, true)?;
        composited_terminal.terminal().set_cooked_mode()?;

        result
    }

    /// Render every frame until the app ends.
    async fn render_loop<T: TermwizTerminal + Send>(
        &mut self,
        surfaces: &mut mpsc::Receiver<FrameUpdate>,
        protocol_rx: &mut tokio::sync::broadcast::Receiver<crate::run::Protocol>,
        protocol_tx: &tokio::sync::broadcast::Sender<crate::run::Protocol>,
        composited_terminal: &mut BufferedTerminal<T>,
    ) -> Result<()> {
        tracing::debug!("Starting render loop");
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "`tokio::select! generates this.`"
        )]
        loop {
            tokio::select! {
                Some(update) = surfaces.recv() => {
                    self.handle_resize(composited_terminal, protocol_tx).await?;
                    self.render(update, composited_terminal).await?;
                }
                Ok(message) = protocol_rx.recv() => {
                    if matches!(message, crate::run::Protocol::End) {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Exited render loop");

        Ok(())
    }

    /// Hide/show the cursor in the end user's terminal.
    fn cursor_visibility(
        composited_terminal: &mut BufferedTerminal<impl TermwizTerminal>,
        is_visible: bool,
    ) -> Result<()> {
        let cursor_visibility = if is_visible {
            termwiz::surface::CursorVisibility::Visible
        } else {
            termwiz::surface::CursorVisibility::Hidden
        };
        composited_terminal.add_change(TermwizChange::CursorVisibility(cursor_visibility));
        composited_terminal.flush()?;

        Ok(())
    }

    /// Do a single render to the user's actual terminal. It uses a diffing algorithm to make
    /// the minimum number of changes.
    async fn render(
        &mut self,
        update: FrameUpdate,
        composited_terminal: &mut BufferedTerminal<impl TermwizTerminal + Send>,
    ) -> Result<()> {
        match update {
            FrameUpdate::BackdropSurface(surface) => {
                self.backdrop = surface.surface;
            }
        }

        let mut new_frame = self.build_frame()?;

        let config = self.state.config.read().await;
        let is_indicator_shown = config.show_indicator;
        drop(config);
        if is_indicator_shown {
            let mode = self.state.color_mode.current();
            let is_attraction_enabled = self.state.get_is_attraction_enabled().await;
            self.add_indicator(&mut new_frame, mode, is_attraction_enabled);
        }

        composited_terminal.draw_from_screen(&new_frame, 0, 0);

        // This is where we actually render to the user's real terminal.
        composited_terminal.flush()?;

        Ok(())
    }

    /// Copy the latest backdrop into a frame the size of the user's terminal.
    fn build_frame(&mut self) -> Result<TermwizSurface> {
        let size = (usize::from(self.width), usize::from(self.height));
        let mut new_frame = TermwizSurface::new(size.0, size.1);
        if self.backdrop.dimensions() == size {
            new_frame.draw_from_screen(&self.backdrop, 0, 0);
            return Ok(new_frame);
        }

        // The backdrop is from before a resize, so clip it to the terminal.
        let backdrop_size = self.backdrop.dimensions();
        let backdrop_cells = self.backdrop.screen_cells();
        for y in 0..size.1.min(backdrop_size.1) {
            for x in 0..size.0.min(backdrop_size.0) {
                Self::add_cell(&mut new_frame, &backdrop_cells, x, y)?;
            }
        }

        Ok(new_frame)
    }

    /// The little status indicator text.
    fn indicator_text(mode: ColorMode, is_attraction_enabled: bool) -> String {
        let attraction = if is_attraction_enabled {
            "attract"
        } else {
            "drift"
        };
        format!(" {mode} · {attraction} ")
    }

    /// Add a little indicator in the top-right to show the mode and whether attraction is on.
    fn add_indicator(
        &self,
        frame: &mut TermwizSurface,
        mode: ColorMode,
        is_attraction_enabled: bool,
    ) {
        let text = Self::indicator_text(mode, is_attraction_enabled);
        let Some(column) = usize::from(self.width).checked_sub(text.chars().count()) else {
            return;
        };

        frame.add_changes(vec![
            TermwizChange::CursorPosition {
                x: TermwizPosition::Absolute(column),
                y: TermwizPosition::Absolute(0),
            },
            crate::surface::Surface::bg_colour(mode.ink(1.0)),
            crate::surface::Surface::fg_colour(mode.paper()),
        ]);
        frame.add_change(text);
    }

    /// Add a single cell to the frame
    fn add_cell(
        frame: &mut TermwizSurface,
        cells: &[&mut [Cell]],
        x: usize,
        y: usize,
    ) -> Result<()> {
        let cell = &cells
            .get(y)
            .context(format!("No y coord ({y}) for cell"))?
            .get(x)
            .context(format!("No x coord ({x}) for cell"))?;

        frame.add_changes(vec![
            TermwizChange::CursorPosition {
                x: TermwizPosition::Absolute(x),
                y: TermwizPosition::Absolute(y),
            },
            TermwizChange::Attribute(termwiz::cell::AttributeChange::Foreground(
                cell.attrs().foreground(),
            )),
            TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(
                cell.attrs().background(),
            )),
        ]);
        frame.add_change(cell.str());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WHITE: particle_field::Colour = (1.0, 1.0, 1.0, 1.0);
    const BLACK: particle_field::Colour = (0.0, 0.0, 0.0, 1.0);

    #[test]
    fn indicator_text() {
        assert_eq!(
            Renderer::indicator_text(ColorMode::Dark, false),
            " dark · drift "
        );
        assert_eq!(
            Renderer::indicator_text(ColorMode::Light, true),
            " light · attract "
        );
    }

    #[tokio::test]
    async fn frames_are_clipped_to_the_terminal() {
        let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
        let state = SharedState::init(3, 1, protocol_tx).await.unwrap();
        let mut renderer = Renderer {
            state,
            width: 2,
            height: 1,
            backdrop: TermwizSurface::default(),
        };

        let mut surface = crate::surface::Surface::new(3, 2);
        surface.add_cell(0, 0, WHITE, BLACK).unwrap();
        surface.add_cell(1, 0, BLACK, BLACK).unwrap();
        surface.add_cell(2, 0, WHITE, BLACK).unwrap();
        renderer.backdrop = surface.surface;

        let mut frame = renderer.build_frame().unwrap();
        assert_eq!(frame.dimensions(), (2, 1));
        let cells = frame.screen_cells();
        let row = cells.first().unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(
            row.first().unwrap().attrs().foreground(),
            crate::surface::Surface::colour_attribute(WHITE)
        );
        assert_eq!(
            row.get(1).unwrap().attrs().foreground(),
            crate::surface::Surface::colour_attribute(BLACK)
        );
    }

    #[tokio::test]
    async fn matching_frames_are_copied_whole() {
        let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
        let state = SharedState::init(2, 1, protocol_tx).await.unwrap();
        let mut surface = crate::surface::Surface::new(2, 1);
        surface.add_cell(0, 0, BLACK, BLACK).unwrap();
        surface.add_cell(1, 0, WHITE, BLACK).unwrap();
        let mut renderer = Renderer {
            state,
            width: 2,
            height: 1,
            backdrop: surface.surface,
        };

        let mut frame = renderer.build_frame().unwrap();
        let cells = frame.screen_cells();
        let row = cells.first().unwrap();
        assert!(row.iter().all(|cell| cell.str() == "▀"));
        assert_eq!(
            row.get(1).unwrap().attrs().foreground(),
            crate::surface::Surface::colour_attribute(WHITE)
        );
    }
}
