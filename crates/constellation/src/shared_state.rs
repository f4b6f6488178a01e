//! Here we store all the data that the app's tasks share.
//! Access is mediated with locks to support asynchronicity

use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::sync::RwLock;

use crate::renderer::Renderer;

/// The size of the user's terminal
#[derive(Default, Debug, Copy, Clone)]
#[expect(
    clippy::exhaustive_structs,
    reason = "It's very unlikely that this is going to have any more fields added to it"
)]
pub struct TTYSize {
    /// Width of the TTY
    pub width: u16,
    /// Height of the TTY
    pub height: u16,
}

/// All the shared data the app uses
#[non_exhaustive]
pub(crate) struct SharedState {
    /// The channel on which all Constellation protocol messages are sent.
    pub protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    /// Location of the config directory.
    pub config_path: RwLock<std::path::PathBuf>,
    /// Name of the main config file.
    pub main_config_file: RwLock<std::path::PathBuf>,
    /// User config
    pub config: RwLock<crate::config::main::Config>,
    /// All the user-configured keybindings.
    pub keybindings: RwLock<crate::config::input::KeybindingsAsEvents>,
    /// Just the size of the user's terminal.
    pub tty_size: RwLock<TTYSize>,
    /// The light/dark theme. Written by the input handler and config reloads, read every frame
    /// by the backdrop.
    pub color_mode: particle_field::color_mode::SharedColorMode,
    /// Whether a held mouse button pulls particles towards the pointer.
    pub is_attraction_enabled: RwLock<bool>,
    /// Is the application logging?
    pub is_logging: RwLock<bool>,
}

impl SharedState {
    /// Initialise the shared state
    pub async fn init(
        width: u16,
        height: u16,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<Arc<Self>> {
        let state = Self {
            protocol_tx,
            config_path: RwLock::default(),
            main_config_file: RwLock::default(),
            config: RwLock::default(),
            keybindings: RwLock::default(),
            tty_size: RwLock::new(TTYSize { width, height }),
            color_mode: particle_field::color_mode::SharedColorMode::default(),
            is_attraction_enabled: RwLock::default(),
            is_logging: RwLock::default(),
        };

        state.set_tty_size(width, height).await;
        Ok(Arc::new(state))
    }

    /// Convenience method to initialise the shared state with the user's terminal's size.
    pub async fn init_with_users_tty_size(
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<Arc<Self>> {
        let tty_size = Renderer::get_users_tty_size()?;
        Self::init(
            tty_size.cols.try_into()?,
            tty_size.rows.try_into()?,
            protocol_tx,
        )
        .await
    }

    /// Get a read lock and return the current TTY size
    pub async fn get_tty_size(&self) -> TTYSize {
        let tty_size = self.tty_size.read().await;
        *tty_size
    }

    /// Get a write lock and set the a new TTY size
    pub async fn set_tty_size(&self, width: u16, height: u16) {
        let mut tty_size = self.tty_size.write().await;
        *tty_size = TTYSize { width, height };
    }

    /// Get a read lock and return whether attraction is enabled.
    pub async fn get_is_attraction_enabled(&self) -> bool {
        let is_enabled = self.is_attraction_enabled.read().await;
        *is_enabled
    }

    /// Flip attraction on or off, returning the new value.
    pub async fn toggle_attraction(&self) -> bool {
        let mut is_enabled = self.is_attraction_enabled.write().await;
        *is_enabled = !*is_enabled;
        *is_enabled
    }
}
