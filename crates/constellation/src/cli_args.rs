//! All the CLI arguments for Constellation

/// The default name of the main config file.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "constellation.toml";

/// An ambient particle backdrop for your terminal.
#[derive(clap::Parser, Debug, Clone)]
#[command(
    version,
    about,
    long_about = "Drifting particles that join up around your mouse pointer. Press `t` to toggle \
                  light/dark mode, `a` to toggle attraction and `q` to quit."
)]
#[non_exhaustive]
pub struct CliArgs {
    /// Start in "light" or "dark" mode. Overrides the config file.
    #[arg(long)]
    pub color_mode: Option<particle_field::color_mode::ColorMode>,

    /// Let a held mouse button pull particles towards the pointer.
    #[arg(long)]
    pub attraction: bool,

    /// Target frame rate. Overrides the config file.
    #[arg(long)]
    pub frame_rate: Option<u32>,

    /// Don't show the status indicator in the top-right.
    #[arg(long)]
    pub disable_indicator: bool,

    /// Use a custom config directory.
    #[arg(long)]
    pub config_dir: Option<std::path::PathBuf>,

    /// Name of the main config file inside the config directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Where to write logs.
    #[arg(long)]
    pub log_path: Option<std::path::PathBuf>,

    /// The maximum level of logs.
    #[arg(long)]
    pub log_level: Option<crate::config::main::LogLevel>,
}
