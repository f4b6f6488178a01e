//! All the maths of the particle field.

use glam::Vec2;
use rand::Rng;

use crate::canvas::Canvas;
use crate::color_mode::ColorMode;
use crate::config::Config;
use crate::particle::Particle;
use crate::pointer::Pointer;

/// The stroke width of the lines between particles.
const LINK_WIDTH: f32 = 1.0;

/// The stroke width of a pointer line from furthest away. It gets up to 1 unit thicker as the
/// particle gets closer.
const MIN_POINTER_LINK_WIDTH: f32 = 0.5;

/// A fixed-size set of particles drifting around a viewport.
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct ParticleField {
    /// Width of the viewport in surface units.
    pub width: f32,
    /// Height of the viewport in surface units.
    pub height: f32,
    /// The live particle set. Only ever replaced wholesale by [`Self::reseed`].
    pub particles: Vec<Particle>,
    /// All the tunable constants.
    pub config: Config,
}

impl ParticleField {
    /// An empty field. Nothing is drawn until it's seeded.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A field made from existing particles.
    #[must_use]
    pub const fn from_particles(
        width: f32,
        height: f32,
        config: Config,
        particles: Vec<Particle>,
    ) -> Self {
        Self {
            width,
            height,
            particles,
            config,
        }
    }

    /// The viewport's dimensions.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Does the field have anywhere to draw?
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// How many particles a viewport of the given size gets.
    #[must_use]
    pub fn particle_count(&self, width: f32, height: f32) -> usize {
        let area = f64::from(width) * f64::from(height);
        if area <= 0.0 || area.is_nan() {
            return 0;
        }

        let count = (area / f64::from(self.config.area_per_particle)).floor();
        #[expect(
            clippy::as_conversions,
            clippy::cast_sign_loss,
            clippy::cast_possible_truncation,
            reason = "The count is positive and `as` saturates"
        )]
        let count = count as usize;
        count.min(self.config.max_particles)
    }

    /// Fit the canvas to a new viewport and replace every particle with a fresh random set.
    pub fn reseed<C: Canvas + ?Sized, R: Rng + ?Sized>(
        &mut self,
        canvas: &mut C,
        width: f32,
        height: f32,
        mode: ColorMode,
        rng: &mut R,
    ) {
        canvas.resize(width, height);

        let count = self.particle_count(width, height);
        let viewport = Vec2::new(width, height);
        let colour = mode.ink(self.config.fill_alpha);
        let particles = (0..count)
            .map(|_| Particle::random(rng, viewport, &self.config, colour))
            .collect();

        self.width = width;
        self.height = height;
        self.particles = particles;
        tracing::debug!("Reseeded particle field ({width}x{height}) with {count} particles");
    }

    /// Advance every particle by one frame and draw the result.
    pub fn step<C: Canvas + ?Sized>(&mut self, canvas: &mut C, pointer: &Pointer, mode: ColorMode) {
        canvas.clear();

        let config = &self.config;
        let fill = mode.ink(config.fill_alpha);
        let (width, height) = (self.width, self.height);

        for index in 0..self.particles.len() {
            // Later particles are read, but not yet moved, when drawing links.
            let (head, tail) = self.particles.split_at_mut(index.saturating_add(1));
            let Some(particle) = head.last_mut() else {
                continue;
            };

            particle.colour = fill;
            Self::attract(config, particle, pointer);

            let render_position = particle.render_position(pointer.parallax_offset);
            particle.drift(width, height);
            canvas.fill_circle(render_position, particle.size, particle.colour);

            for other in tail.iter() {
                let other_position = other.render_position(pointer.parallax_offset);
                let distance = render_position.distance(other_position);
                if distance < config.link_distance {
                    let opacity = config.link_opacity * (1.0 - distance / config.link_distance);
                    canvas.stroke_line(render_position, other_position, LINK_WIDTH, mode.ink(opacity));
                }
            }

            if pointer.is_seen {
                let distance = render_position.distance(pointer.position);
                if distance < config.pointer_link_distance {
                    let closeness = 1.0 - distance / config.pointer_link_distance;
                    let opacity = config.pointer_link_opacity * closeness;
                    let stroke = closeness + MIN_POINTER_LINK_WIDTH;
                    canvas.stroke_line(render_position, pointer.position, stroke, mode.ink(opacity));
                }
            }
        }
    }

    /// Pull a particle towards the pointer, swelling it, or return it to its natural size.
    fn attract(config: &Config, particle: &mut Particle, pointer: &Pointer) {
        let delta = pointer.position - particle.position;
        let distance = delta.length();

        if pointer.is_attracting() && distance < config.attraction_radius {
            let force = (1.0 - distance / config.attraction_radius) * config.attraction_strength;
            particle.position += delta * force * config.attraction_step;
            particle.size = particle.base_size * force.mul_add(config.attraction_growth, 1.0);
        } else {
            particle.size = particle.base_size;
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::indexing_slicing,
    clippy::float_cmp,
    reason = "Tests aren't so strict"
)]
mod test {
    use rand::SeedableRng as _;

    use super::*;
    use crate::tests::helpers::{DrawCommand, RecordingCanvas};

    const WHITE_FILL: crate::Colour = (1.0, 1.0, 1.0, 0.5);

    fn still_particle(x: f32, y: f32, size: f32) -> Particle {
        Particle::new(Vec2::new(x, y), size, Vec2::ZERO, WHITE_FILL)
    }

    fn field_with(particles: Vec<Particle>) -> ParticleField {
        ParticleField::from_particles(1000.0, 1000.0, Config::default(), particles)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "{actual} is not close to {expected}"
        );
    }

    #[test]
    fn particle_count_scenarios() {
        let field = ParticleField::new(Config::default());
        assert_eq!(field.particle_count(1800.0, 1000.0), 120);
        assert_eq!(field.particle_count(300.0, 200.0), 6);
        assert_eq!(field.particle_count(90.0, 99.0), 0);
        assert_eq!(field.particle_count(0.0, 500.0), 0);
        assert_eq!(field.particle_count(-10.0, 500.0), 0);
    }

    #[test]
    fn reseed_replaces_the_whole_set() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut canvas = RecordingCanvas::default();
        let mut field = ParticleField::new(Config::default());

        field.reseed(&mut canvas, 1800.0, 1000.0, ColorMode::Dark, &mut rng);
        assert_eq!(field.particles.len(), 120);
        assert_eq!(canvas.size, (1800.0, 1000.0));
        let first = field.particles.clone();

        field.reseed(&mut canvas, 300.0, 200.0, ColorMode::Light, &mut rng);
        assert_eq!(field.particles.len(), 6);
        assert_eq!(canvas.size, (300.0, 200.0));
        assert!(field.particles.iter().all(|particle| !first.contains(particle)));
        assert!(field
            .particles
            .iter()
            .all(|particle| particle.colour == (0.0, 0.0, 0.0, 0.5)));
    }

    #[test]
    fn count_is_fixed_between_reseeds() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut canvas = RecordingCanvas::default();
        let mut field = ParticleField::new(Config::default());
        field.reseed(&mut canvas, 600.0, 600.0, ColorMode::Dark, &mut rng);
        let pointer = Pointer::default();
        for _ in 0..100 {
            field.step(&mut canvas, &pointer, ColorMode::Dark);
            assert_eq!(field.particles.len(), 40);
        }
    }

    #[test]
    fn size_stays_at_base_without_attraction() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut canvas = RecordingCanvas::default();
        let mut field = ParticleField::new(Config::default());
        field.reseed(&mut canvas, 800.0, 600.0, ColorMode::Dark, &mut rng);

        let mut pointer = Pointer::default();
        pointer.moved(Vec2::new(400.0, 300.0), field.viewport(), 50.0);
        pointer.is_pressed = true;

        for _ in 0..50 {
            field.step(&mut canvas, &pointer, ColorMode::Dark);
            for particle in &field.particles {
                assert_eq!(particle.size, particle.base_size);
            }
        }
    }

    #[test]
    fn attraction_pulls_and_swells() {
        let mut field = field_with(vec![still_particle(100.0, 100.0, 2.0)]);
        let mut canvas = RecordingCanvas::default();
        let pointer = Pointer {
            position: Vec2::new(160.0, 180.0),
            is_pressed: true,
            is_attraction_enabled: true,
            is_seen: true,
            ..Pointer::default()
        };

        field.step(&mut canvas, &pointer, ColorMode::Dark);

        // Distance is 100, so force is 0.25 and the displacement is 2.5% of the delta.
        let particle = &field.particles[0];
        assert_close(particle.size, 3.0);
        assert_close(particle.position.x, 100.0 + 60.0 * 0.025);
        assert_close(particle.position.y, 100.0 + 80.0 * 0.025);
        assert!(particle.size >= particle.base_size);
    }

    #[test]
    fn attraction_ignores_far_particles() {
        let mut field = field_with(vec![still_particle(100.0, 100.0, 2.0)]);
        let mut canvas = RecordingCanvas::default();
        let pointer = Pointer {
            position: Vec2::new(400.0, 100.0),
            is_pressed: true,
            is_attraction_enabled: true,
            is_seen: true,
            ..Pointer::default()
        };

        field.step(&mut canvas, &pointer, ColorMode::Dark);
        assert_eq!(field.particles[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(field.particles[0].size, 2.0);
    }

    #[test]
    fn attraction_and_drift_compound() {
        let mut particle = still_particle(100.0, 100.0, 2.0);
        particle.velocity = Vec2::new(0.4, 0.0);
        let mut field = field_with(vec![particle]);
        let mut canvas = RecordingCanvas::default();
        let pointer = Pointer {
            position: Vec2::new(200.0, 100.0),
            is_pressed: true,
            is_attraction_enabled: true,
            is_seen: true,
            ..Pointer::default()
        };

        field.step(&mut canvas, &pointer, ColorMode::Dark);
        // force = 0.25, pull = 100 * 0.25 * 0.1
        assert_close(field.particles[0].position.x, 100.0 + 2.5 + 0.4);
    }

    #[test]
    fn link_opacity_fades_with_distance() {
        let mut field = field_with(vec![
            still_particle(100.0, 100.0, 2.0),
            still_particle(160.0, 100.0, 2.0),
            still_particle(100.0, 400.0, 2.0),
        ]);
        let mut canvas = RecordingCanvas::default();
        field.step(&mut canvas, &Pointer::default(), ColorMode::Dark);

        let links = canvas.lines();
        assert_eq!(links.len(), 1);
        let (from, to, width, colour) = links[0];
        assert_eq!(from, Vec2::new(100.0, 100.0));
        assert_eq!(to, Vec2::new(160.0, 100.0));
        assert_eq!(width, 1.0);
        assert_close(colour.3, 0.2 * (1.0 - 60.0 / 120.0));
    }

    #[test]
    fn no_link_at_threshold() {
        let mut field = field_with(vec![
            still_particle(100.0, 100.0, 2.0),
            still_particle(220.0, 100.0, 2.0),
        ]);
        let mut canvas = RecordingCanvas::default();
        field.step(&mut canvas, &Pointer::default(), ColorMode::Dark);
        assert!(canvas.lines().is_empty());

        // The same spot gets a line once the pointer has actually been there.
        let mut pointer = Pointer::default();
        pointer.moved(Vec2::ZERO, field.viewport(), 50.0);
        let mut canvas = RecordingCanvas::default();
        field.step(&mut canvas, &pointer, ColorMode::Dark);
        assert_eq!(canvas.lines().len(), 1);
    }

    #[test]
    fn each_pair_is_linked_once() {
        let mut field = field_with(vec![
            still_particle(100.0, 100.0, 2.0),
            still_particle(110.0, 100.0, 2.0),
            still_particle(120.0, 100.0, 2.0),
            still_particle(130.0, 100.0, 2.0),
        ]);
        let mut canvas = RecordingCanvas::default();
        field.step(&mut canvas, &Pointer::default(), ColorMode::Dark);
        assert_eq!(canvas.lines().len(), 6);
        assert_eq!(canvas.circles().len(), 4);
    }

    #[test]
    fn pointer_line_uses_render_position() {
        let mut field = field_with(vec![still_particle(500.0, 500.0, 2.0)]);
        let mut canvas = RecordingCanvas::default();
        let mut pointer = Pointer::default();
        // Pointer at the centre has no parallax.
        pointer.moved(Vec2::new(500.0, 575.0), field.viewport(), 50.0);
        let offset = pointer.parallax_offset;

        field.step(&mut canvas, &pointer, ColorMode::Light);

        let render_position = Vec2::new(500.0, 500.0) + offset * 1.0;
        let distance = render_position.distance(pointer.position);
        let lines = canvas.lines();
        assert_eq!(lines.len(), 1);
        let (from, to, width, colour) = lines[0];
        assert_eq!(from, render_position);
        assert_eq!(to, pointer.position);
        assert_close(width, (1.0 - distance / 150.0) + 0.5);
        assert_close(colour.3, 0.3 * (1.0 - distance / 150.0));
        assert_eq!((colour.0, colour.1, colour.2), (0.0, 0.0, 0.0));
    }

    #[test]
    fn unseen_pointer_has_no_line() {
        let mut field = field_with(vec![still_particle(1.0, 1.0, 2.0)]);
        let mut canvas = RecordingCanvas::default();
        field.step(&mut canvas, &Pointer::default(), ColorMode::Dark);
        assert!(canvas.lines().is_empty());

        // The same spot gets a line once the pointer has actually been there.
        let mut pointer = Pointer::default();
        pointer.moved(Vec2::ZERO, field.viewport(), 50.0);
        let mut canvas = RecordingCanvas::default();
        field.step(&mut canvas, &pointer, ColorMode::Dark);
        assert_eq!(canvas.lines().len(), 1);
    }

    #[test]
    fn frame_starts_by_clearing_and_draws_circles_at_render_positions() {
        let mut field = field_with(vec![still_particle(100.0, 100.0, 2.0)]);
        let mut canvas = RecordingCanvas::default();
        let pointer = Pointer {
            parallax_offset: Vec2::new(10.0, 0.0),
            ..Pointer::default()
        };
        field.step(&mut canvas, &pointer, ColorMode::Dark);

        assert_eq!(canvas.commands[0], DrawCommand::Clear);
        assert_eq!(
            canvas.circles(),
            vec![(Vec2::new(110.0, 100.0), 2.0, WHITE_FILL)]
        );
        assert_eq!(field.particles[0].position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn reflection_preserves_speed() {
        let mut particle = still_particle(999.8, 500.0, 1.0);
        particle.velocity = Vec2::new(0.3, 0.1);
        let mut field = field_with(vec![particle]);
        let mut canvas = RecordingCanvas::default();

        field.step(&mut canvas, &Pointer::default(), ColorMode::Dark);
        assert_eq!(field.particles[0].velocity, Vec2::new(-0.3, 0.1));
        field.step(&mut canvas, &Pointer::default(), ColorMode::Dark);
        assert_eq!(field.particles[0].velocity, Vec2::new(-0.3, 0.1));
    }
}
