//! Read all the raw input directly from the end user.

use std::io::Read as _;

use color_eyre::eyre::Result;

/// Bytes from STDIN
pub type BytesFromSTDIN = [u8; 128];

/// Input from STDIN that has been parsed into known mouse/keyboard/etc events.
#[derive(Debug, Clone)]
pub(crate) struct ParsedInput {
    /// The parsed event
    pub event: termwiz::input::InputEvent,
}

/// Listens to the user's STDIN.
pub(crate) struct RawInput {
    /// The main Constellation protocol channel.
    protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
}

impl RawInput {
    /// Start a thread to listen and parse the end user's STDIN and forward it to the rest of the
    /// application.
    pub fn start(
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> std::thread::JoinHandle<std::result::Result<(), color_eyre::eyre::Error>> {
        // Tokio's docs suggest a plain thread for interactive STDIN.
        std::thread::spawn(move || -> Result<()> {
            let protocol_for_shutdown = protocol_tx.clone();
            let input = Self { protocol_tx };
            let result = input.consume_stdin();
            crate::run::broadcast_protocol_end(&protocol_for_shutdown);
            result
        })
    }

    /// Listen to the end user's STDIN and parse all the bytes into events.
    fn consume_stdin(&self) -> Result<()> {
        tracing::debug!("Starting to listen on STDIN");

        let stdin = std::io::stdin();
        let mut reader = std::io::BufReader::new(stdin);
        let mut parser = termwiz::input::InputParser::new();

        loop {
            let mut buffer: BytesFromSTDIN = [0; 128];
            let count = reader.read(&mut buffer[..])?;
            if count == 0 {
                tracing::debug!("STDIN closed");
                return Ok(());
            }

            if let Some(bytes) = buffer.get(0..count) {
                tracing::trace!("Received STDIN input: {bytes:x?}");
                parser.parse(bytes, |event| self.parsed_bytes_callback(event), false);
            } else {
                tracing::warn!("Couldn't get bytes from STDIN input buffer");
            }
        }
    }

    /// The callback for when the input parser detects known keyboard/mouse events.
    fn parsed_bytes_callback(&self, event: termwiz::input::InputEvent) {
        tracing::trace!("Parsed input event: {event:?}");

        let result = self
            .protocol_tx
            .send(crate::run::Protocol::Input(ParsedInput { event }));
        if let Err(error) = result {
            tracing::error!("Error sending input event from thread to task: {error:?}");
        }
    }
}
