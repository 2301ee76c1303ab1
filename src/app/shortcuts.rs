use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pacer_core::config::AppConfig;
use pacer_core::session::SessionCommand;

/// What a key press asks the front end to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Session(SessionCommand),
}

/// Resolve a key press against the configured bindings. Digits 1-9 always
/// pick the chunk size and Ctrl+C always quits.
pub fn action_for_key(config: &AppConfig, key: KeyEvent) -> Option<KeyAction> {
    if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
        return Some(KeyAction::Quit);
    }
    if let KeyCode::Char(digit @ '1'..='9') = key.code {
        if key.modifiers.is_empty() {
            let size = digit.to_digit(10).unwrap_or(1) as usize;
            return Some(KeyAction::Session(SessionCommand::SetChunkSize { size }));
        }
    }

    let pressed = pressed_token(key.code)?;
    let modifiers = key.modifiers;
    let bindings: [(&str, &str, KeyAction); 12] = [
        (
            config.key_toggle_play_pause.as_str(),
            "space",
            KeyAction::Session(SessionCommand::TogglePlayPause),
        ),
        (config.key_quit.as_str(), "q", KeyAction::Quit),
        (
            config.key_next_chunk.as_str(),
            "right",
            KeyAction::Session(SessionCommand::NextChunk),
        ),
        (
            config.key_prev_chunk.as_str(),
            "left",
            KeyAction::Session(SessionCommand::PrevChunk),
        ),
        (
            config.key_prev_word.as_str(),
            "backspace",
            KeyAction::Session(SessionCommand::PrevWord),
        ),
        (
            config.key_next_container.as_str(),
            "n",
            KeyAction::Session(SessionCommand::NextContainer),
        ),
        (
            config.key_prev_container.as_str(),
            "p",
            KeyAction::Session(SessionCommand::PrevContainer),
        ),
        (config.key_stop.as_str(), "s", KeyAction::Session(SessionCommand::Stop)),
        (
            config.key_speed_up.as_str(),
            "up",
            KeyAction::Session(SessionCommand::SpeedUp),
        ),
        (
            config.key_speed_down.as_str(),
            "down",
            KeyAction::Session(SessionCommand::SpeedDown),
        ),
        (
            config.key_cycle_highlight.as_str(),
            "h",
            KeyAction::Session(SessionCommand::CycleHighlight),
        ),
        (
            config.key_toggle_theme.as_str(),
            "t",
            KeyAction::Session(SessionCommand::ToggleTheme),
        ),
    ];

    bindings
        .into_iter()
        .find(|(raw, fallback, _)| shortcut_matches(raw, fallback, &pressed, modifiers))
        .map(|(_, _, action)| action)
}

fn pressed_token(code: KeyCode) -> Option<String> {
    let token = match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(ch) => ch.to_ascii_lowercase().to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        _ => return None,
    };
    Some(token)
}

pub fn shortcut_matches(raw: &str, fallback: &str, pressed: &str, modifiers: KeyModifiers) -> bool {
    let normalized = normalize_shortcut_token(raw, fallback);

    let mut required_ctrl = false;
    let mut required_alt = false;
    let mut required_logo = false;
    let mut required_shift = false;
    let mut required_key: Option<&str> = None;

    for token in normalized
        .split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        match token {
            "ctrl" | "control" => required_ctrl = true,
            "alt" => required_alt = true,
            "logo" | "meta" | "super" | "cmd" | "command" => required_logo = true,
            "shift" => required_shift = true,
            key => required_key = Some(key),
        }
    }

    let required_key = required_key.unwrap_or(fallback);
    if pressed != required_key {
        return false;
    }

    modifiers.contains(KeyModifiers::CONTROL) == required_ctrl
        && modifiers.contains(KeyModifiers::ALT) == required_alt
        && modifiers.contains(KeyModifiers::SUPER) == required_logo
        && modifiers.contains(KeyModifiers::SHIFT) == required_shift
}

pub fn normalize_shortcut_token(raw: &str, fallback: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized
            .replace("spacebar", "space")
            .replace("arrowleft", "left")
            .replace("arrowright", "right")
            .replace("arrowup", "up")
            .replace("arrowdown", "down")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn normalizes_spacebar_alias() {
        assert_eq!(normalize_shortcut_token(" SpaceBar ", "x"), "space");
        assert_eq!(normalize_shortcut_token("ArrowRight", "x"), "right");
        assert_eq!(normalize_shortcut_token("  ", "q"), "q");
    }

    #[test]
    fn matches_ctrl_shortcut() {
        assert!(shortcut_matches("ctrl+n", "x", "n", KeyModifiers::CONTROL));
    }

    #[test]
    fn rejects_unexpected_extra_modifier() {
        assert!(!shortcut_matches(
            "ctrl+n",
            "x",
            "n",
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ));
    }

    #[test]
    fn default_bindings_map_to_commands() {
        let config = AppConfig::default();
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(KeyAction::Session(SessionCommand::TogglePlayPause))
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Right, KeyModifiers::NONE)),
            Some(KeyAction::Session(SessionCommand::NextChunk))
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(KeyAction::Session(SessionCommand::PrevWord))
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('z'), KeyModifiers::NONE)),
            None
        );
    }

    #[test]
    fn digits_select_chunk_size_and_ctrl_c_quits() {
        let config = AppConfig::default();
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('7'), KeyModifiers::NONE)),
            Some(KeyAction::Session(SessionCommand::SetChunkSize { size: 7 }))
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn rebound_keys_replace_defaults() {
        let config = AppConfig {
            key_next_chunk: "l".to_string(),
            key_quit: "ctrl+q".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('l'), KeyModifiers::NONE)),
            Some(KeyAction::Session(SessionCommand::NextChunk))
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Right, KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('q'), KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            action_for_key(&config, press(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }
}
