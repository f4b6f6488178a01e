//! A terminal surface where every cell shows two vertically stacked pixels.

use color_eyre::eyre::{bail, Result};
use particle_field::Colour;
use termwiz::cell::AttributeChange;
use termwiz::color::{ColorAttribute, SrgbaTuple};
use termwiz::surface::Change as TermwizChange;
use termwiz::surface::Position as TermwizPosition;

/// The upper half block. Its foreground is the upper pixel and its background the lower one.
const UPPER_HALF_BLOCK: &str = "▀";

/// A terminal-sized grid of half-block cells.
#[derive(Clone)]
pub(crate) struct Surface {
    /// Width in columns
    pub width: usize,
    /// Height in rows
    pub height: usize,
    /// The cells themselves
    pub surface: termwiz::surface::Surface,
}

impl Surface {
    /// Instantiate
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            surface: termwiz::surface::Surface::new(width, height),
        }
    }

    /// Paint the cell at `col`/`row` with an upper and a lower pixel.
    pub fn add_cell(
        &mut self,
        col: usize,
        row: usize,
        upper: Colour,
        lower: Colour,
    ) -> Result<()> {
        if col >= self.width || row >= self.height {
            bail!(
                "Cell ({col}, {row}) is outside of the {}x{} surface",
                self.width,
                self.height
            );
        }

        self.surface.add_changes(vec![
            TermwizChange::CursorPosition {
                x: TermwizPosition::Absolute(col),
                y: TermwizPosition::Absolute(row),
            },
            Self::fg_colour(upper),
            Self::bg_colour(lower),
        ]);
        self.surface.add_change(UPPER_HALF_BLOCK);
        Ok(())
    }

    /// Our colour as a `termwiz` colour attribute.
    #[must_use]
    pub const fn colour_attribute(colour: Colour) -> ColorAttribute {
        ColorAttribute::TrueColorWithDefaultFallback(SrgbaTuple(
            colour.0, colour.1, colour.2, colour.3,
        ))
    }

    /// A change to the background colour.
    #[must_use]
    pub const fn bg_colour(colour: Colour) -> TermwizChange {
        TermwizChange::Attribute(AttributeChange::Background(Self::colour_attribute(colour)))
    }

    /// A change to the foreground colour.
    #[must_use]
    pub const fn fg_colour(colour: Colour) -> TermwizChange {
        TermwizChange::Attribute(AttributeChange::Foreground(Self::colour_attribute(colour)))
    }
}

#[cfg(test)]
#[expect(clippy::indexing_slicing, reason = "Tests aren't so strict")]
mod test {
    use super::*;

    const WHITE: Colour = (1.0, 1.0, 1.0, 1.0);
    const RED: Colour = (1.0, 0.0, 0.0, 1.0);

    #[test]
    fn cells_hold_both_pixels() {
        let mut surface = Surface::new(2, 2);
        surface.add_cell(1, 1, RED, WHITE).unwrap();

        let cells = surface.surface.screen_cells();
        assert_eq!(cells[0][0].str(), " ");
        let cell = &cells[1][1];
        assert_eq!(cell.str(), "▀");
        assert_eq!(cell.attrs().foreground(), Surface::colour_attribute(RED));
        assert_eq!(cell.attrs().background(), Surface::colour_attribute(WHITE));
    }

    #[test]
    fn cells_outside_the_surface_are_an_error() {
        let mut surface = Surface::new(2, 1);
        let error = surface.add_cell(0, 1, RED, RED).unwrap_err();
        assert_eq!(
            error.root_cause().to_string(),
            "Cell (0, 1) is outside of the 2x1 surface"
        );
    }
}
