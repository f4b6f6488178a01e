//! Main entrypoint for running Constellation

use std::sync::Arc;

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use crate::cli_args::CliArgs;
use crate::raw_input::RawInput;
use crate::renderer::Renderer;
use crate::shared_state::SharedState;

/// Rendered output that is sent to the renderer.
pub(crate) enum FrameUpdate {
    /// A complete frame of the particle backdrop, including the cursor.
    BackdropSurface(crate::surface::Surface),
}

/// Commands to control the various tasks/threads
#[non_exhaustive]
#[derive(Clone, Debug)]
pub(crate) enum Protocol {
    /// The entire application is exiting.
    End,
    /// User's TTY is resized.
    Resize {
        /// Width of new terminal.
        width: u16,
        /// Height of new terminal.
        height: u16,
    },
    /// Parsed input from STDIN.
    Input(crate::raw_input::ParsedInput),
    /// Constellation's configuration.
    Config(crate::config::main::Config),
    /// A known user-defined keybinding event was triggered.
    KeybindEvent(crate::config::input::KeybindingAction),
    /// The light/dark mode was changed.
    ColorModeChanged(particle_field::color_mode::ColorMode),
    /// Pointer attraction was switched on or off.
    AttractionChanged(bool),
}

/// Main entrypoint
pub(crate) async fn run(state_arc: &std::sync::Arc<SharedState>) -> Result<()> {
    let protocol_tx = state_arc.protocol_tx.clone();
    setup(state_arc).await?;

    let (renderer, surfaces_tx) = Renderer::start(Arc::clone(state_arc), protocol_tx.clone());
    let config_handle = crate::config::main::Config::watch(Arc::clone(state_arc));
    let input_handler = crate::input_handler::InputHandler::start(Arc::clone(state_arc));
    let input_thread_handle = RawInput::start(protocol_tx.clone());

    override_on_panic_behaviour();
    let backdrop_handle =
        crate::layers::backdrop::Backdrop::start(surfaces_tx, Arc::clone(state_arc));

    let backdrop_result = backdrop_handle.await;
    tracing::debug!("🏁 left backdrop task, exiting Constellation...");
    broadcast_protocol_end(&protocol_tx);

    if input_thread_handle.is_finished() {
        // The STDIN loop is blocked on reads, so it can't listen for the protocol's `End`.
        // Therefore we only join it if it finished because of its own error.
        input_thread_handle
            .join()
            .map_err(|err| color_eyre::eyre::eyre!("STDIN handle: {err:?}"))??;
    }
    input_handler.await??;
    renderer.await??;
    config_handle.await??;
    backdrop_result??;

    tracing::trace!("Leaving Constellation's main `run()` function");
    Ok(())
}

/// The default behaviour prints all panics to the CLI, which would corrupt the rendered
/// backdrop. So panics in tasks are logged instead. `set_hook` is global, so this is called as
/// late as possible.
fn override_on_panic_behaviour() {
    std::panic::set_hook(Box::new(|info| {
        let message = if let Some(message) = info.payload().downcast_ref::<String>() {
            message
        } else if let Some(message) = info.payload().downcast_ref::<&str>() {
            message
        } else {
            "Caught a panic with an unknown type."
        };
        let location = match info.location() {
            Some(location) => format!(
                "{}@{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
            None => "Unknown location".to_owned(),
        };
        tracing::error!("Caught panic ({}): {message:?}", location);
    }));
}

/// Signal all task/thread loops to exit.
///
/// The error is handled here rather than bubbled, because the `End` signal is itself what allows
/// the central error handler to be reached.
pub(crate) fn broadcast_protocol_end(protocol_tx: &tokio::sync::broadcast::Sender<Protocol>) {
    tracing::debug!("Broadcasting the protocol `End` message to all listeners");
    let result = protocol_tx.send(Protocol::End);
    if let Err(error) = result {
        tracing::error!("{error:?}");
    }
}

/// Prepare the application to start.
async fn setup(state: &std::sync::Arc<SharedState>) -> Result<()> {
    let cli_args = CliArgs::parse();

    let mut main_config_file = state.main_config_file.write().await;
    (*main_config_file).clone_from(&cli_args.main_config);
    drop(main_config_file);

    let directory_result =
        crate::config::main::Config::setup_directory(cli_args.config_dir.clone(), state).await;
    if let Err(directory_error) = directory_result {
        color_eyre::eyre::bail!("Error setting up config directory: {directory_error:?}");
    }

    let config_result = crate::config::main::Config::load_config_into_shared_state(state).await;
    if let Err(config_error) = config_result {
        let path = crate::config::main::Config::main_config_path(state).await;
        color_eyre::eyre::bail!(
            "Bad config file: {config_error:?}\n\nConfig path: {}",
            path.display()
        );
    }

    setup_logging(cli_args.clone(), state).await?;
    apply_cli_overrides(&cli_args, state).await;

    tracing::info!("Starting Constellation");
    tracing::debug!("Loaded config: {:?}", state.config.read().await);

    let tty_size = crate::renderer::Renderer::get_users_tty_size()?;
    state
        .set_tty_size(tty_size.cols.try_into()?, tty_size.rows.try_into()?)
        .await;

    Ok(())
}

/// CLI arguments take precedence over the config file.
async fn apply_cli_overrides(cli_args: &CliArgs, state: &std::sync::Arc<SharedState>) {
    let mut config = state.config.write().await;

    if cli_args.disable_indicator {
        config.show_indicator = false;
    }
    if let Some(frame_rate) = cli_args.frame_rate {
        config.frame_rate = frame_rate;
    }
    if cli_args.attraction {
        config.attraction = true;
    }
    if let Some(color_mode) = cli_args.color_mode {
        config.color_mode = color_mode;
    }

    state.color_mode.set(config.color_mode);
    *state.is_attraction_enabled.write().await = config.attraction;
    drop(config);
}

/// Setup logging
async fn setup_logging(cli_args: CliArgs, state: &std::sync::Arc<SharedState>) -> Result<()> {
    let are_log_filters_manually_set = std::env::var("CONSTELLATION_LOG").is_ok();
    let mut path = state.config.read().await.log_path.clone();

    if let Some(cli_override_path) = cli_args.log_path {
        path = cli_override_path;
    }

    let mut level = state.config.read().await.log_level.clone();
    if let Some(cli_override_level) = cli_args.log_level {
        level = cli_override_level;
    }
    let level_as_string = format!("{level:?}").to_lowercase();

    let is_loggable =
        !matches!(level, crate::config::main::LogLevel::Off) || are_log_filters_manually_set;

    if !is_loggable {
        return Ok(());
    }

    let directory = path.parent().context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(path.clone())?;

    let filters = if are_log_filters_manually_set {
        if let Ok(user_filters) = std::env::var("CONSTELLATION_LOG") {
            std::env::set_var("RUST_LOG", user_filters);
        }

        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("error".parse()?)
            .from_env_lossy()
    } else {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("constellation={level_as_string}").parse()?)
            .add_directive(format!("particle_field={level_as_string}").parse()?)
    };

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_filter(filters);

    let tracing_setup = tracing_subscriber::registry().with(logfile_layer);

    if std::env::var_os("ENABLE_TOKIO_CONSOLE") == Some("1".into()) {
        let console_layer = console_subscriber::spawn();
        tracing_setup.with(console_layer).init();
    } else {
        tracing_setup.init();
    }

    state.config.write().await.log_path = path;
    let mut is_logging = state.is_logging.write().await;
    *is_logging = true;
    drop(is_logging);

    Ok(())
}
