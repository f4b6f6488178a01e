//! What the simulation knows about the user's pointer.

use glam::Vec2;

/// The last known state of the pointer. Written by input handlers, only ever read by the frame
/// step.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct Pointer {
    /// Last observed position in surface space.
    pub position: Vec2,
    /// How far to shift particles for the parallax effect, derived from `position`.
    pub parallax_offset: Vec2,
    /// Whether a pointer button is currently held.
    pub is_pressed: bool,
    /// Whether holding a button should pull particles towards the pointer.
    pub is_attraction_enabled: bool,
    /// Whether the pointer has been seen at all since the host started. Until it has, its
    /// `position` is just the default origin, so no connectors are drawn to it. A page that
    /// starts the pointer at (0, 0) would draw connectors to that corner instead.
    pub is_seen: bool,
}

impl Pointer {
    /// Record a new pointer position and recalculate the parallax offset. The offset points away
    /// from the pointer, relative to the centre of the viewport.
    pub fn moved(&mut self, position: Vec2, viewport: Vec2, parallax_strength: f32) {
        self.position = position;
        self.is_seen = true;
        self.parallax_offset = Vec2::new(
            Self::parallax_axis(position.x, viewport.x, parallax_strength),
            Self::parallax_axis(position.y, viewport.y, parallax_strength),
        );
    }

    /// The parallax offset along a single axis.
    fn parallax_axis(position: f32, extent: f32, strength: f32) -> f32 {
        if extent <= 0.0 {
            return 0.0;
        }
        (0.5 - position / extent) * strength
    }

    /// The attraction flag: particles are only pulled while a button is held and attraction is
    /// switched on.
    #[must_use]
    pub const fn is_attracting(&self) -> bool {
        self.is_pressed && self.is_attraction_enabled
    }
}
