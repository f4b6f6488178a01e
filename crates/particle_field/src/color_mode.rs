//! The light/dark presentation setting and the ways of reading it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use snafu::OptionExt as _;

use crate::errors::{ParticleFieldError, UnknownColorModeSnafu};
use crate::Colour;

/// The active presentation mode.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColorMode {
    /// Dark backgrounds, so particles are white.
    #[default]
    Dark,
    /// Light backgrounds, so particles are black.
    Light,
}

impl ColorMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// The colour of particles, connectors and the cursor at the given alpha.
    #[must_use]
    pub const fn ink(self, alpha: f32) -> Colour {
        match self {
            Self::Dark => (1.0, 1.0, 1.0, alpha),
            Self::Light => (0.0, 0.0, 0.0, alpha),
        }
    }

    /// The colour that the backdrop is drawn over.
    #[must_use]
    pub const fn paper(self) -> Colour {
        match self {
            Self::Dark => (0.0, 0.0, 0.0, 1.0),
            Self::Light => (1.0, 1.0, 1.0, 1.0),
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dark => write!(formatter, "dark"),
            Self::Light => write!(formatter, "light"),
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = ParticleFieldError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mode = match name.trim().to_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        };
        mode.context(UnknownColorModeSnafu { name })
    }
}

/// Anything that can say what the current colour mode is. The simulation reads this once per
/// frame and never writes to it.
pub trait ColorModeSource {
    /// The current colour mode.
    fn current(&self) -> ColorMode;
}

impl ColorModeSource for ColorMode {
    fn current(&self) -> ColorMode {
        *self
    }
}

/// A colour mode that can be shared between a single writer (eg a theme toggle) and any number
/// of readers.
#[derive(Clone, Debug, Default)]
pub struct SharedColorMode {
    /// Whether the light mode is active. Dark is the default.
    is_light: Arc<AtomicBool>,
}

impl SharedColorMode {
    /// Instantiate with a starting mode.
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        let shared = Self::default();
        shared.set(mode);
        shared
    }

    /// Change the mode.
    pub fn set(&self, mode: ColorMode) {
        self.is_light
            .store(matches!(mode, ColorMode::Light), Ordering::Relaxed);
    }

    /// Flip between light and dark, returning the new mode.
    pub fn toggle(&self) -> ColorMode {
        let was_light = self.is_light.fetch_xor(true, Ordering::Relaxed);
        if was_light {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }
}

impl ColorModeSource for SharedColorMode {
    fn current(&self) -> ColorMode {
        if self.is_light.load(Ordering::Relaxed) {
            ColorMode::Light
        } else {
            ColorMode::Dark
        }
    }
}
