//! A single point of the backdrop.

use glam::Vec2;
use rand::Rng;

use crate::Colour;

/// A single particle
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Particle {
    /// Where the particle is. Only ever changed by drift and attraction.
    pub position: Vec2,
    /// The radius the particle was born with.
    pub base_size: f32,
    /// The radius the particle is currently drawn with. Never smaller than `base_size`.
    pub size: f32,
    /// How far the particle drifts per frame. Only its signs ever change.
    pub velocity: Vec2,
    /// The fill colour, refreshed from the colour mode every frame.
    pub colour: Colour,
}

impl Particle {
    /// Instantiate
    #[must_use]
    pub const fn new(position: Vec2, base_size: f32, velocity: Vec2, colour: Colour) -> Self {
        Self {
            position,
            base_size,
            size: base_size,
            velocity,
            colour,
        }
    }

    /// A particle at a random place within the viewport, with a random size and drift.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        viewport: Vec2,
        config: &crate::config::Config,
        colour: Colour,
    ) -> Self {
        let position = Vec2::new(
            rng.gen::<f32>() * viewport.x,
            rng.gen::<f32>() * viewport.y,
        );
        let base_size = rng.gen_range(config.min_size..config.max_size);
        let velocity = Vec2::new(
            Self::random_speed(rng, config.max_speed),
            Self::random_speed(rng, config.max_speed),
        );
        Self::new(position, base_size, velocity, colour)
    }

    /// A speed in `[-max, max)`.
    fn random_speed<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
        rng.gen::<f32>().mul_add(max * 2.0, -max)
    }

    /// Where the particle should be drawn. Larger particles are shifted further, giving a sense
    /// of depth. The stored position is never touched.
    #[must_use]
    pub fn render_position(&self, parallax_offset: Vec2) -> Vec2 {
        self.position + parallax_offset * (self.size / 2.0)
    }

    /// Move by one frame of drift, then bounce off any edge that's been crossed. Bouncing only
    /// flips the velocity, the particle isn't pushed back inside.
    pub fn drift(&mut self, width: f32, height: f32) {
        self.position += self.velocity;

        if self.position.x < 0.0 || self.position.x > width {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > height {
            self.velocity.y = -self.velocity.y;
        }
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng as _;

    use super::*;

    #[test]
    fn random_particles_are_within_bounds() {
        let config = crate::config::Config::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let viewport = Vec2::new(300.0, 200.0);
        for _ in 0..1000 {
            let particle = Particle::random(&mut rng, viewport, &config, (1.0, 1.0, 1.0, 0.5));
            assert!((0.0..300.0).contains(&particle.position.x));
            assert!((0.0..200.0).contains(&particle.position.y));
            assert!((1.0..3.0).contains(&particle.base_size));
            assert!((-0.4..0.4).contains(&particle.velocity.x));
            assert!((-0.4..0.4).contains(&particle.velocity.y));
            assert_eq!(particle.size, particle.base_size);
        }
    }

    #[test]
    fn bounces_off_right_edge() {
        let mut particle = Particle::new(
            Vec2::new(99.9, 50.0),
            1.0,
            Vec2::new(0.4, -0.2),
            (1.0, 1.0, 1.0, 0.5),
        );
        particle.drift(100.0, 100.0);
        assert!(particle.position.x > 100.0);
        assert_eq!(particle.velocity, Vec2::new(-0.4, -0.2));
    }

    #[test]
    fn bounces_off_both_axes_at_a_corner() {
        let mut particle = Particle::new(
            Vec2::new(0.1, 0.1),
            1.0,
            Vec2::new(-0.3, -0.3),
            (1.0, 1.0, 1.0, 0.5),
        );
        particle.drift(100.0, 100.0);
        assert_eq!(particle.velocity, Vec2::new(0.3, 0.3));
    }

    #[test]
    fn render_position_scales_with_size() {
        let mut particle = Particle::new(Vec2::new(10.0, 10.0), 2.0, Vec2::ZERO, (0.0, 0.0, 0.0, 1.0));
        assert_eq!(
            particle.render_position(Vec2::new(4.0, -2.0)),
            Vec2::new(14.0, 8.0)
        );
        particle.size = 4.0;
        assert_eq!(
            particle.render_position(Vec2::new(4.0, -2.0)),
            Vec2::new(18.0, 6.0)
        );
        assert_eq!(particle.position, Vec2::new(10.0, 10.0));
    }
}
