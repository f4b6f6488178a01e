//! User-defined keybindings.

/// A single keybinding as written in the config file.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
pub(crate) struct KeybindingConfigRaw {
    /// The modifier keys, like `CTRL`, `SHIFT`, etc.
    pub mods: Option<String>,
    /// The actual key, like a `t` or `Home`.
    pub key: String,
}

/// Everything a user can trigger from the keyboard.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeybindingAction {
    /// Flip between light and dark mode.
    ToggleColorMode,
    /// Turn pointer attraction on or off.
    ToggleAttraction,
    /// Exit Constellation.
    Quit,
}

/// All the user-configured keybindings, as they appear in the config.
pub(crate) type KeybindingsRaw = std::collections::HashMap<KeybindingAction, KeybindingConfigRaw>;

/// The user keybindings converted to native `termwiz::input::KeyEvent`s.
pub(crate) type KeybindingsAsEvents =
    std::collections::HashMap<KeybindingAction, termwiz::input::KeyEvent>;

impl TryFrom<KeybindingConfigRaw> for termwiz::input::KeyEvent {
    type Error = std::io::Error;

    /// `termwiz::input::KeyEvent` can't be built from a string, but it does derive
    /// `serde::Deserialize`, so TOML is used as the stepping stone between our config syntax and
    /// termwiz's.
    fn try_from(binding: KeybindingConfigRaw) -> std::result::Result<Self, Self::Error> {
        let key = if binding.key.chars().count() == 1 {
            format!("{{ Char = \"{}\" }}", binding.key)
        } else {
            format!("\"{}\"", binding.key)
        };

        let config = format!(
            "
                modifiers = {{ bits = 0 }}
                key = {key}
            ",
        );

        let mut key_event = toml::from_str::<Self>(&config).map_err(|error| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "Couldn't parse keybinding ({binding:?}): Invalid key: {}",
                    error.message()
                ),
            )
        })?;

        if let Some(modifiers) = binding.mods {
            key_event.modifiers = modifiers.try_into().map_err(|error| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Couldn't parse keybinding modifier: {error:?}"),
                )
            })?;
        }

        Ok(key_event)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(config: &str) -> termwiz::input::KeyEvent {
        let parsed: KeybindingConfigRaw = toml::from_str(config).unwrap();
        parsed.try_into().unwrap()
    }

    #[test]
    fn keybinding_t() {
        let expected = termwiz::input::KeyEvent {
            modifiers: termwiz::input::Modifiers::NONE,
            key: termwiz::input::KeyCode::Char('t'),
        };
        assert_eq!(run(r#"key = "t""#), expected);
    }

    #[test]
    fn keybinding_ctrl_shift_q() {
        let config = r#"
            mods = "CTRL|SHIFT"
            key = "q"
        "#;
        let expected = termwiz::input::KeyEvent {
            modifiers: termwiz::input::Modifiers::CTRL | termwiz::input::Modifiers::SHIFT,
            key: termwiz::input::KeyCode::Char('q'),
        };
        assert_eq!(run(config), expected);
    }

    #[test]
    fn keybinding_named_key() {
        let expected = termwiz::input::KeyEvent {
            modifiers: termwiz::input::Modifiers::ALT,
            key: termwiz::input::KeyCode::Home,
        };
        assert_eq!(
            run(
                r#"
                mods = "ALT"
                key = "Home"
                "#
            ),
            expected
        );
    }

    #[test]
    fn unknown_key_is_an_error() {
        let parsed: KeybindingConfigRaw = toml::from_str(r#"key = "NotAKey""#).unwrap();
        let result: std::result::Result<termwiz::input::KeyEvent, _> = parsed.try_into();
        assert!(result.is_err());
    }

    #[test]
    fn actions_use_snake_case() {
        let raw: KeybindingsRaw = toml::from_str(
            r#"
            toggle_color_mode = { key = "t" }
            toggle_attraction = { key = "a" }
            quit = { key = "q" }
            "#,
        )
        .unwrap();
        assert_eq!(raw.len(), 3);
        assert!(raw.contains_key(&KeybindingAction::ToggleAttraction));
    }
}
