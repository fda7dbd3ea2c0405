use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A key press as the viewer sees it, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyInput {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    Enter,
    Escape,
    Backspace,
    Char(char),
    /// Ctrl-C. Always quits, whatever the bindings say.
    Interrupt,
    Unknown,
}

impl FromStr for KeyInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyInput::Char(c));
        }

        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(KeyInput::Up),
            "down" => Ok(KeyInput::Down),
            "left" => Ok(KeyInput::Left),
            "right" => Ok(KeyInput::Right),
            "pageup" | "pgup" => Ok(KeyInput::PageUp),
            "pagedown" | "pgdown" | "pgdn" => Ok(KeyInput::PageDown),
            "home" => Ok(KeyInput::Home),
            "end" => Ok(KeyInput::End),
            "tab" => Ok(KeyInput::Tab),
            "enter" | "return" => Ok(KeyInput::Enter),
            "esc" | "escape" => Ok(KeyInput::Escape),
            "backspace" => Ok(KeyInput::Backspace),
            "space" => Ok(KeyInput::Char(' ')),
            other => Err(format!("unknown key name '{}'", other)),
        }
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyInput::Up => "up",
            KeyInput::Down => "down",
            KeyInput::Left => "left",
            KeyInput::Right => "right",
            KeyInput::PageUp => "pageup",
            KeyInput::PageDown => "pagedown",
            KeyInput::Home => "home",
            KeyInput::End => "end",
            KeyInput::Tab => "tab",
            KeyInput::Enter => "enter",
            KeyInput::Escape => "esc",
            KeyInput::Backspace => "backspace",
            KeyInput::Char(' ') => "space",
            KeyInput::Char(c) => return write!(f, "{}", c),
            KeyInput::Interrupt => "ctrl-c",
            KeyInput::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl TryFrom<String> for KeyInput {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyInput> for String {
    fn from(key: KeyInput) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Quit,
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    SwitchView,
    OpenImages,
    Edit,
}
