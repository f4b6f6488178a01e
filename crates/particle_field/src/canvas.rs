//! The drawing surface that the simulation renders to.
//!
//! All coordinates are in "surface space": the same units as the viewport dimensions given to
//! [`crate::field::ParticleField::reseed`]. It's up to the implementor to map them to whatever
//! its real pixels are.

use glam::Vec2;

use crate::Colour;

/// A 2D drawing surface.
pub trait Canvas {
    /// Make the surface exactly match the viewport's dimensions. Previous contents may be lost.
    fn resize(&mut self, width: f32, height: f32);

    /// Wipe the whole surface.
    fn clear(&mut self);

    /// Draw a filled circle. The colour's alpha should be blended with what's already drawn.
    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour);

    /// Draw a straight line of the given stroke width.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Colour);
}
