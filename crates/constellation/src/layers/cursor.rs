//! A custom cursor, drawn on top of the particles: a ring with a dot in the middle.

use palette::{Darken as _, Lighten as _};
use particle_field::canvas::Canvas;
use particle_field::color_mode::ColorMode;
use particle_field::pointer::Pointer;
use particle_field::{Colour, Vec2};

/// How many straight lines make up the ring.
const RING_SEGMENTS: u16 = 24;

/// How much the ring is shaded towards the paper colour.
const RING_SHADE: f32 = 0.3;

/// User config for the cursor.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    /// Whether to draw it at all.
    pub enabled: bool,
    /// The radius of the outer ring.
    pub ring_radius: f32,
    /// The radius of the centre dot.
    pub dot_radius: f32,
    /// How much the ring shrinks whilst a mouse button is held.
    pub pressed_scale: f32,
    /// Opacity of the whole cursor.
    pub alpha: f32,
    /// Viewports this wide or narrower don't get a cursor.
    pub min_viewport_width: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            ring_radius: 16.0,
            dot_radius: 3.0,
            pressed_scale: 0.75,
            alpha: 0.5,
            min_viewport_width: 768.0,
        }
    }
}

impl Config {
    /// Is there a cursor to draw?
    pub fn is_visible(&self, pointer: &Pointer, viewport_width: f32) -> bool {
        self.enabled && pointer.is_seen && viewport_width > self.min_viewport_width
    }

    /// The radius of the ring, which shrinks whilst pressed.
    pub fn ring_radius(&self, pointer: &Pointer) -> f32 {
        if pointer.is_pressed {
            self.ring_radius * self.pressed_scale
        } else {
            self.ring_radius
        }
    }

    /// The ring colour. Both parts share the ink colour, and as a purely visual embellishment
    /// the ring is then shaded a little towards the paper so it reads softer than the dot.
    pub fn ring_colour(&self, mode: ColorMode) -> Colour {
        let colour: palette::Srgba<f32> = palette::rgb::Rgba::from(mode.ink(self.alpha));
        let shaded = if mode == ColorMode::Light {
            colour.lighten(RING_SHADE)
        } else {
            colour.darken(RING_SHADE)
        };
        shaded.into()
    }

    /// Draw the cursor, if it's visible.
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        pointer: &Pointer,
        viewport_width: f32,
        mode: ColorMode,
    ) {
        if !self.is_visible(pointer, viewport_width) {
            return;
        }

        let radius = self.ring_radius(pointer);
        let ring_colour = self.ring_colour(mode);
        let step = std::f32::consts::TAU / f32::from(RING_SEGMENTS);
        for segment in 0..RING_SEGMENTS {
            let start_angle = f32::from(segment) * step;
            let from = pointer.position + Vec2::from_angle(start_angle) * radius;
            let to = pointer.position + Vec2::from_angle(start_angle + step) * radius;
            canvas.stroke_line(from, to, 1.0, ring_colour);
        }

        canvas.fill_circle(pointer.position, self.dot_radius, mode.ink(self.alpha));
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "Tests aren't so strict")]
mod test {
    use particle_field::tests::helpers::RecordingCanvas;

    use super::*;

    fn seen_pointer(is_pressed: bool) -> Pointer {
        let mut pointer = Pointer::default();
        pointer.moved(Vec2::new(400.0, 300.0), Vec2::new(1000.0, 600.0), 50.0);
        pointer.is_pressed = is_pressed;
        pointer
    }

    #[test]
    fn draws_ring_and_dot() {
        let config = Config::default();
        let mut canvas = RecordingCanvas::default();
        config.draw(&mut canvas, &seen_pointer(false), 1000.0, ColorMode::Dark);

        assert_eq!(canvas.lines().len(), usize::from(RING_SEGMENTS));
        let circles = canvas.circles();
        assert_eq!(circles.len(), 1);
        let (centre, radius, colour) = circles.first().unwrap();
        assert_eq!(*centre, Vec2::new(400.0, 300.0));
        assert_eq!(*radius, 3.0);
        assert_eq!(*colour, (1.0, 1.0, 1.0, 0.5));

        let (from, _, _, _) = canvas.lines().first().copied().unwrap();
        assert!((from.distance(Vec2::new(400.0, 300.0)) - 16.0).abs() < 1e-3);
    }

    #[test]
    fn ring_shrinks_when_pressed() {
        let config = Config::default();
        assert_eq!(config.ring_radius(&seen_pointer(true)), 12.0);
        assert_eq!(config.ring_radius(&seen_pointer(false)), 16.0);
    }

    #[test]
    fn hidden_on_narrow_viewports_or_unseen_pointers() {
        let config = Config::default();
        let mut canvas = RecordingCanvas::default();
        config.draw(&mut canvas, &seen_pointer(false), 767.0, ColorMode::Dark);
        config.draw(&mut canvas, &Pointer::default(), 1000.0, ColorMode::Dark);
        assert_eq!(canvas.draw_count(), 0);

        let disabled = Config {
            enabled: false,
            ..Config::default()
        };
        disabled.draw(&mut canvas, &seen_pointer(false), 1000.0, ColorMode::Dark);
        assert_eq!(canvas.draw_count(), 0);
    }

    #[test]
    fn minimum_width_itself_is_too_narrow() {
        let config = Config::default();
        assert!(!config.is_visible(&seen_pointer(false), 768.0));
        assert!(config.is_visible(&seen_pointer(false), 769.0));
    }

    #[test]
    fn ring_is_shaded_towards_the_paper() {
        let config = Config::default();
        let dark_ring = config.ring_colour(ColorMode::Dark);
        assert!(dark_ring.0 < 1.0 && dark_ring.0 > 0.5);

        let light_ring = config.ring_colour(ColorMode::Light);
        assert!(light_ring.0 > 0.0 && light_ring.0 < 0.5);
        assert_eq!(light_ring.3, 0.5);
    }
}
