//! Turn parsed input events into Constellation actions.

use color_eyre::eyre::Result;

use crate::config::input::KeybindingAction;

/// Handles keyboard input from the end user. Mouse input is left for the backdrop.
pub(crate) struct InputHandler {
    /// Shared app state
    state: std::sync::Arc<crate::shared_state::SharedState>,
}

impl InputHandler {
    /// Start listening for input on the protocol.
    pub fn start(
        state: std::sync::Arc<crate::shared_state::SharedState>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let mut protocol_rx = state.protocol_tx.subscribe();
        tokio::spawn(async move {
            let handler = Self { state };
            loop {
                let message = match protocol_rx.recv().await {
                    Ok(message) => message,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!("Input handler lagged by {count} messages");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };

                #[expect(clippy::wildcard_enum_match_arm, reason = "It's our internal protocol")]
                match message {
                    crate::run::Protocol::End => break,
                    crate::run::Protocol::Input(input) => {
                        if let termwiz::input::InputEvent::Key(key_event) = &input.event {
                            handler.handle_key_event(key_event).await;
                        }
                    }
                    _ => (),
                }
            }

            tracing::debug!("Leaving input handler loop");
            Ok(())
        })
    }

    /// `CTRL+c` always quits, because raw mode swallows the usual `SIGINT`.
    fn is_interrupt(key_event: &termwiz::input::KeyEvent) -> bool {
        key_event.modifiers.contains(termwiz::input::Modifiers::CTRL)
            && matches!(key_event.key, termwiz::input::KeyCode::Char('c' | 'C'))
    }

    /// Find the action, if any, bound to the key.
    async fn find_action(&self, key_event: &termwiz::input::KeyEvent) -> Option<KeybindingAction> {
        if Self::is_interrupt(key_event) {
            return Some(KeybindingAction::Quit);
        }

        let keybindings = self.state.keybindings.read().await;
        keybindings
            .iter()
            .find_map(|(action, binding)| (binding == key_event).then_some(*action))
    }

    /// Handle a key event that we have a keybinding for.
    async fn handle_key_event(&self, key_event: &termwiz::input::KeyEvent) {
        let Some(action) = self.find_action(key_event).await else {
            return;
        };
        tracing::debug!("Keybinding triggered: {action:?}");
        self.send(crate::run::Protocol::KeybindEvent(action));

        match action {
            KeybindingAction::ToggleColorMode => {
                let mode = self.state.color_mode.toggle();
                tracing::debug!("Colour mode is now: {mode}");
                self.send(crate::run::Protocol::ColorModeChanged(mode));
            }
            KeybindingAction::ToggleAttraction => {
                let is_enabled = self.state.toggle_attraction().await;
                tracing::debug!("Attraction enabled: {is_enabled}");
                self.send(crate::run::Protocol::AttractionChanged(is_enabled));
            }
            KeybindingAction::Quit => crate::run::broadcast_protocol_end(&self.state.protocol_tx),
        }
    }

    /// Send on the protocol, logging any failure.
    fn send(&self, message: crate::run::Protocol) {
        if let Err(error) = self.state.protocol_tx.send(message) {
            tracing::error!("Couldn't send input event on protocol channel: {error:?}");
        }
    }
}
