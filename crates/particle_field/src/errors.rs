//! Errors for this library

/// All the known errors returned by this crate.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ParticleFieldError {
    #[snafu(display("Unknown colour mode '{name}', expected 'light' or 'dark'"))]
    /// A colour mode name that isn't one of the known modes
    UnknownColorMode {
        /// The name that couldn't be parsed
        name: String,
    },

    #[snafu(display("Invalid particle config, `{field}` {reason} (got {value})"))]
    /// A config value that would make the simulation misbehave
    InvalidConfig {
        /// The name of the offending config field
        field: &'static str,
        /// What the value should have been
        reason: &'static str,
        /// The offending value
        value: f32,
    },
}
