//! Shared state and behaviour useful to everything that draws into the terminal.

use color_eyre::eyre::Result;

/// Shared state and behaviour useful to everything that draws into the terminal.
pub(crate) struct Layer {
    /// A unique identifier.
    pub id: String,
    /// A channel to send final rendered output.
    pub output_channel: tokio::sync::mpsc::Sender<crate::run::FrameUpdate>,
    /// The surface on which to construct the next frame.
    pub surface: crate::surface::Surface,
    /// TTY width
    pub width: u16,
    /// TTY height
    pub height: u16,
}

impl Layer {
    /// Instantiate
    pub(crate) fn new(
        id: String,
        output_channel: tokio::sync::mpsc::Sender<crate::run::FrameUpdate>,
    ) -> Self {
        Self {
            id,
            output_channel,
            surface: crate::surface::Surface::new(0, 0),
            width: 0,
            height: 0,
        }
    }

    /// Create an empty surface ready for building a new frame.
    pub fn initialise_surface(&mut self) {
        self.surface = crate::surface::Surface::new(self.width.into(), self.height.into());
    }

    /// Keep track of the size of the user's terminal.
    pub const fn set_tty_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Handle common protocol messages. Returns whether the terminal was resized.
    pub(crate) fn handle_common_protocol_messages(&mut self, message: &crate::run::Protocol) -> bool {
        tracing::trace!("'{}' received protocol message: {message:?}", self.id);

        if let crate::run::Protocol::Resize { width, height } = message {
            self.set_tty_size(*width, *height);
            return true;
        }

        false
    }

    /// The size of the terminal in pixels, ie half-block characters.
    pub fn pixel_dimensions(&self) -> (f32, f32) {
        (f32::from(self.width), f32::from(self.height) * 2.0)
    }

    /// Send the final surface to the main renderer.
    pub(crate) async fn send_output(&mut self) -> Result<()> {
        self.output_channel
            .send(crate::run::FrameUpdate::BackdropSurface(self.surface.clone()))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resizes_from_protocol() {
        let (output, _) = tokio::sync::mpsc::channel(1);
        let mut layer = Layer::new("test".to_owned(), output);
        assert_eq!(layer.pixel_dimensions(), (0.0, 0.0));

        let is_resized = layer.handle_common_protocol_messages(&crate::run::Protocol::Resize {
            width: 10,
            height: 4,
        });
        assert!(is_resized);
        assert_eq!(layer.pixel_dimensions(), (10.0, 8.0));

        assert!(!layer.handle_common_protocol_messages(&crate::run::Protocol::End));
    }
}
