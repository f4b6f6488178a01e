//! A canvas that remembers everything drawn on it, so that frames can be asserted on.

use glam::Vec2;

use crate::Colour;

/// A single call made to a [`crate::canvas::Canvas`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DrawCommand {
    /// The canvas was resized
    Resize(f32, f32),
    /// The canvas was wiped
    Clear,
    /// A filled circle
    Circle {
        /// Centre of the circle
        centre: Vec2,
        /// Radius of the circle
        radius: f32,
        /// Fill colour
        colour: Colour,
    },
    /// A straight line
    Line {
        /// Start of the line
        from: Vec2,
        /// End of the line
        to: Vec2,
        /// Stroke width
        width: f32,
        /// Stroke colour
        colour: Colour,
    },
}

/// A canvas that just records draw commands.
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct RecordingCanvas {
    /// The current dimensions.
    pub size: (f32, f32),
    /// Everything drawn since the last clear, including the clear itself.
    pub commands: Vec<DrawCommand>,
    /// Every command ever received.
    pub history: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// Record a command.
    fn record(&mut self, command: DrawCommand) {
        self.history.push(command.clone());
        self.commands.push(command);
    }

    /// All the circles in the current frame.
    #[must_use]
    pub fn circles(&self) -> Vec<(Vec2, f32, Colour)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Circle {
                    centre,
                    radius,
                    colour,
                } => Some((*centre, *radius, *colour)),
                DrawCommand::Resize(..) | DrawCommand::Clear | DrawCommand::Line { .. } => None,
            })
            .collect()
    }

    /// All the lines in the current frame.
    #[must_use]
    pub fn lines(&self) -> Vec<(Vec2, Vec2, f32, Colour)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    colour,
                } => Some((*from, *to, *width, *colour)),
                DrawCommand::Resize(..) | DrawCommand::Clear | DrawCommand::Circle { .. } => None,
            })
            .collect()
    }

    /// How many commands have been drawn over the canvas's whole life.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.history
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    DrawCommand::Circle { .. } | DrawCommand::Line { .. }
                )
            })
            .count()
    }
}

impl crate::canvas::Canvas for RecordingCanvas {
    fn resize(&mut self, width: f32, height: f32) {
        self.size = (width, height);
        self.record(DrawCommand::Resize(width, height));
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.record(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour) {
        self.record(DrawCommand::Circle {
            centre,
            radius,
            colour,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Colour) {
        self.record(DrawCommand::Line {
            from,
            to,
            width,
            colour,
        });
    }
}
