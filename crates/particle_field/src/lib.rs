//! # Particle Field
//! An ambient backdrop of drifting particles that are joined by faint lines when they come close
//! to each other and to the pointer.
//!
//! The simulation knows nothing about where it is drawn. Hosts implement [`canvas::Canvas`] for
//! their drawing surface and [`color_mode::ColorModeSource`] for their light/dark theme, then
//! drive a [`backdrop::Backdrop`] from their own event loop. [`frame_loop::FrameLoop`] provides
//! the paint-synchronised ticking, with explicit start and stop.

#![expect(clippy::pub_use, reason = "How else are you supposed re-export??")]

pub mod backdrop;
pub mod canvas;
pub mod color_mode;
pub mod config;
pub mod errors;
pub mod field;
pub mod frame_loop;
pub mod particle;
pub mod pointer;

/// Helpers for testing hosts and the simulation itself.
pub mod tests {
    pub mod helpers;
}

pub use glam::Vec2;

/// An RGBA colour, each channel in the range `0.0..=1.0`.
pub type Colour = (f32, f32, f32, f32);
