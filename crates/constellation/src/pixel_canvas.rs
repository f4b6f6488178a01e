//! A drawing surface made of terminal "pixels", ie half-block characters.
//!
//! Everything drawn is alpha-blended over the colour mode's paper colour. Shapes smaller than a
//! pixel still light the pixel they fall in, otherwise most particles would be invisible.

use color_eyre::eyre::Result;
use particle_field::{Colour, Vec2};

/// A pixel buffer that the particle field draws into.
pub(crate) struct PixelCanvas {
    /// How many surface units fit into a single pixel.
    scale: f32,
    /// Width in pixels.
    width: usize,
    /// Height in pixels.
    height: usize,
    /// The colour underneath everything.
    paper: termwiz::color::SrgbaTuple,
    /// Row-major pixels.
    pixels: Vec<termwiz::color::SrgbaTuple>,
}

impl PixelCanvas {
    /// Instantiate an empty canvas.
    pub fn new(scale: f32, paper: Colour) -> Self {
        Self {
            scale,
            width: 0,
            height: 0,
            paper: to_srgba(paper),
            pixels: Vec::new(),
        }
    }

    /// The number of surface units per pixel.
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the number of surface units per pixel. Takes effect on the next resize.
    pub const fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Change the colour everything is drawn over. Takes effect on the next clear.
    pub fn set_paper(&mut self, paper: Colour) {
        self.paper = to_srgba(paper);
    }

    /// Dimensions in pixels.
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The colour of a single pixel.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Colour> {
        if x >= self.width {
            return None;
        }
        let index = y.checked_mul(self.width)?.checked_add(x)?;
        self.pixels.get(index).map(|pixel| from_srgba(*pixel))
    }

    /// Write every pair of pixels into a terminal cell. An odd last row is paired with the paper.
    pub fn flush(&self, surface: &mut crate::surface::Surface) -> Result<()> {
        let (width, height) = self.dimensions();
        let rows = height.div_ceil(2).min(surface.height);
        let columns = width.min(surface.width);
        let paper = from_srgba(self.paper);
        for row in 0..rows {
            let upper_y = row.saturating_mul(2);
            for col in 0..columns {
                let upper = self.pixel(col, upper_y).unwrap_or(paper);
                let lower = self.pixel(col, upper_y.saturating_add(1)).unwrap_or(paper);
                surface.add_cell(col, row, upper, lower)?;
            }
        }
        Ok(())
    }

    /// Convert surface units to whole pixel coordinates, if they're on the canvas.
    fn to_pixel(&self, point: Vec2) -> Option<(usize, usize)> {
        let x = (point.x / self.scale).floor();
        let y = (point.y / self.scale).floor();
        if x < 0.0 || y < 0.0 {
            return None;
        }

        #[expect(
            clippy::as_conversions,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "Both are positive and floored, and `as` saturates"
        )]
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Alpha-blend a colour onto a single pixel.
    fn blend(&mut self, x: usize, y: usize, colour: Colour) {
        let Some(index) = y.checked_mul(self.width).and_then(|row| row.checked_add(x)) else {
            return;
        };
        let Some(pixel) = self.pixels.get_mut(index) else {
            return;
        };

        let above = to_srgba(colour);
        let mut blended = pixel.interpolate(above, above.3.into());
        blended.3 = 1.0;
        *pixel = blended;
    }

    /// Convert a length in surface units to pixels.
    fn units_to_pixels(&self, length: f32) -> f32 {
        length / self.scale
    }

    /// Convert a dimension in surface units to a whole number of pixels.
    fn dimension_in_pixels(&self, length: f32) -> usize {
        let pixels = self.units_to_pixels(length).round();
        if pixels.is_nan() || pixels <= 0.0 {
            return 0;
        }

        #[expect(
            clippy::as_conversions,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "It's positive and `as` saturates"
        )]
        let pixels = pixels as usize;
        pixels
    }
}

/// Our colour tuple as a `termwiz` colour.
const fn to_srgba(colour: Colour) -> termwiz::color::SrgbaTuple {
    termwiz::color::SrgbaTuple(colour.0, colour.1, colour.2, colour.3)
}

/// A `termwiz` colour as our colour tuple.
const fn from_srgba(colour: termwiz::color::SrgbaTuple) -> Colour {
    (colour.0, colour.1, colour.2, colour.3)
}

impl particle_field::canvas::Canvas for PixelCanvas {
    fn resize(&mut self, width: f32, height: f32) {
        self.width = self.dimension_in_pixels(width);
        self.height = self.dimension_in_pixels(height);
        self.clear();
    }

    fn clear(&mut self) {
        let size = self.width.saturating_mul(self.height);
        self.pixels.clear();
        self.pixels.resize(size, self.paper);
    }

    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour) {
        let centre_in_pixels = centre / self.scale;
        let radius_in_pixels = self.units_to_pixels(radius);
        let reach = radius_in_pixels.ceil();

        let mut is_any_lit = false;
        #[expect(
            clippy::as_conversions,
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            reason = "Canvas coordinates are small"
        )]
        {
            let min_y = (centre_in_pixels.y - reach).floor() as i64;
            let max_y = (centre_in_pixels.y + reach).ceil() as i64;
            let min_x = (centre_in_pixels.x - reach).floor() as i64;
            let max_x = (centre_in_pixels.x + reach).ceil() as i64;
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let pixel_centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    if pixel_centre.distance(centre_in_pixels) > radius_in_pixels {
                        continue;
                    }
                    let (Ok(pixel_x), Ok(pixel_y)) = (usize::try_from(x), usize::try_from(y))
                    else {
                        continue;
                    };
                    if pixel_x < self.width && pixel_y < self.height {
                        self.blend(pixel_x, pixel_y, colour);
                        is_any_lit = true;
                    }
                }
            }
        }

        if !is_any_lit {
            if let Some((x, y)) = self.to_pixel(centre) {
                self.blend(x, y, colour);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Colour) {
        let start = from / self.scale;
        let end = to / self.scale;
        let steps = (end - start).abs().max_element().ceil().max(1.0);
        let radius = self.units_to_pixels(width) / 2.0;

        let mut last = None;
        #[expect(
            clippy::as_conversions,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss,
            reason = "Canvas coordinates are small"
        )]
        for step in 0..=(steps as u32) {
            let point = start.lerp(end, step as f32 / steps);
            if radius > 1.0 {
                self.fill_circle(point * self.scale, radius * self.scale, colour);
                continue;
            }

            // Each pixel is only blended once per line.
            let Some(pixel) = self.to_pixel(point * self.scale) else {
                continue;
            };
            if last == Some(pixel) {
                continue;
            }
            last = Some(pixel);
            self.blend(pixel.0, pixel.1, colour);
        }
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "Tests aren't so strict")]
mod test {
    use particle_field::canvas::Canvas as _;

    use super::*;

    const BLACK: Colour = (0.0, 0.0, 0.0, 1.0);
    const WHITE: Colour = (1.0, 1.0, 1.0, 1.0);

    fn canvas() -> PixelCanvas {
        let mut canvas = PixelCanvas::new(8.0, BLACK);
        canvas.resize(80.0, 40.0);
        canvas
    }

    fn is_lit(canvas: &PixelCanvas, x: usize, y: usize) -> bool {
        canvas.pixel(x, y).unwrap() != BLACK
    }

    fn lit_count(canvas: &PixelCanvas) -> usize {
        let (width, height) = canvas.dimensions();
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|(x, y)| is_lit(canvas, *x, *y))
            .count()
    }

    #[test]
    fn resize_uses_scale() {
        let canvas = canvas();
        assert_eq!(canvas.dimensions(), (10, 5));
        assert_eq!(canvas.pixel(9, 4), Some(BLACK));
        assert_eq!(canvas.pixel(10, 4), None);
    }

    #[test]
    fn tiny_circles_light_their_pixel() {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(20.0, 20.0), 1.0, (1.0, 1.0, 1.0, 0.5));

        assert_eq!(lit_count(&canvas), 1);
        let pixel = canvas.pixel(2, 2).unwrap();
        assert!(pixel.0 > 0.0 && pixel.0 < 1.0);
        assert_eq!(pixel.3, 1.0);
    }

    #[test]
    fn opaque_colours_replace_the_paper() {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(20.0, 20.0), 1.0, WHITE);
        let pixel = canvas.pixel(2, 2).unwrap();
        assert!(pixel.0 > 0.99 && pixel.1 > 0.99 && pixel.2 > 0.99);
    }

    #[test]
    fn big_circles_light_many_pixels() {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(40.0, 20.0), 16.0, WHITE);
        assert!(lit_count(&canvas) > 4);
        assert!(is_lit(&canvas, 5, 2));
    }

    #[test]
    fn off_canvas_drawing_is_ignored() {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(-20.0, 500.0), 2.0, WHITE);
        canvas.stroke_line(Vec2::new(-50.0, -50.0), Vec2::new(-10.0, -10.0), 1.0, WHITE);
        assert_eq!(lit_count(&canvas), 0);
    }

    #[test]
    fn lines_join_their_ends() {
        let mut canvas = canvas();
        canvas.stroke_line(Vec2::new(4.0, 4.0), Vec2::new(76.0, 4.0), 1.0, WHITE);
        for x in 0..10 {
            assert!(is_lit(&canvas, x, 0), "pixel {x} isn't lit");
        }
        assert!(!is_lit(&canvas, 0, 1));
    }

    #[test]
    fn lines_blend_each_pixel_once() {
        let mut canvas = canvas();
        let colour = (1.0, 1.0, 1.0, 0.5);
        canvas.stroke_line(Vec2::new(1.0, 1.0), Vec2::new(6.0, 6.0), 1.0, colour);

        let mut expected = canvas_pixel_after_single_blend(colour);
        expected.3 = 1.0;
        assert_eq!(canvas.pixel(0, 0).unwrap(), expected);
    }

    fn canvas_pixel_after_single_blend(colour: Colour) -> Colour {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(4.0, 4.0), 1.0, colour);
        canvas.pixel(0, 0).unwrap()
    }

    #[test]
    fn clear_repaints_the_paper() {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(20.0, 20.0), 1.0, WHITE);
        canvas.set_paper(WHITE);
        canvas.clear();
        assert_eq!(canvas.pixel(2, 2), Some(WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));
    }

    #[test]
    fn flushes_to_a_surface() {
        let mut canvas = canvas();
        canvas.fill_circle(Vec2::new(4.0, 4.0), 1.0, WHITE);
        let mut surface = crate::surface::Surface::new(10, 3);
        canvas.flush(&mut surface).unwrap();

        let cells = surface.surface.screen_cells();
        let row = cells.first().unwrap();
        assert_eq!(row.len(), 10);
        assert!(row.iter().all(|cell| cell.str() == "▀"));
        assert_ne!(
            row.first().unwrap().attrs().foreground(),
            row.get(1).unwrap().attrs().foreground()
        );
        assert_eq!(
            row.first().unwrap().attrs().background(),
            crate::surface::Surface::colour_attribute(BLACK)
        );
    }

    #[test]
    fn odd_last_row_is_paired_with_the_paper() {
        let mut canvas = PixelCanvas::new(8.0, BLACK);
        canvas.resize(16.0, 24.0);
        canvas.fill_circle(Vec2::new(4.0, 20.0), 1.0, WHITE);
        let mut surface = crate::surface::Surface::new(2, 2);
        canvas.flush(&mut surface).unwrap();

        let cells = surface.surface.screen_cells();
        let cell = cells.get(1).unwrap().first().unwrap();
        assert_eq!(cell.str(), "▀");
        assert_ne!(
            cell.attrs().foreground(),
            crate::surface::Surface::colour_attribute(BLACK)
        );
        assert_eq!(
            cell.attrs().background(),
            crate::surface::Surface::colour_attribute(BLACK)
        );
    }
}
