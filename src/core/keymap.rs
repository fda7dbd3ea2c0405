use crate::config::toml_config::{KeyBindings, KeysConfig};
use crate::domain::keys::{Command, KeyInput};
use std::collections::HashMap;

/// Key to command lookup for the two views.
#[derive(Debug, Clone)]
pub struct Keymap {
    toc: HashMap<KeyInput, Command>,
    chapter: HashMap<KeyInput, Command>,
}

fn default_toc() -> Vec<(Command, Vec<KeyInput>)> {
    use KeyInput::*;
    vec![
        (Command::Quit, vec![Char('q'), Escape]),
        (Command::LineDown, vec![Down]),
        (Command::LineUp, vec![Up]),
        (Command::PageDown, vec![PageDown]),
        (Command::PageUp, vec![PageUp]),
        (Command::SwitchView, vec![Tab, Right, Left, Enter]),
    ]
}

// Up/Down page through a chapter, PgUp/PgDown move by a line.
fn default_chapter() -> Vec<(Command, Vec<KeyInput>)> {
    use KeyInput::*;
    vec![
        (Command::Quit, vec![Char('q'), Escape]),
        (Command::PageDown, vec![Down]),
        (Command::PageUp, vec![Up]),
        (Command::LineDown, vec![PageDown]),
        (Command::LineUp, vec![PageUp]),
        (Command::SwitchView, vec![Tab, Right, Left]),
        (Command::OpenImages, vec![Char('i')]),
        (Command::Edit, vec![Char('e')]),
    ]
}

fn overrides(bindings: &KeyBindings) -> Vec<(Command, &Option<Vec<KeyInput>>)> {
    vec![
        (Command::Quit, &bindings.quit),
        (Command::LineDown, &bindings.line_down),
        (Command::LineUp, &bindings.line_up),
        (Command::PageDown, &bindings.page_down),
        (Command::PageUp, &bindings.page_up),
        (Command::SwitchView, &bindings.switch),
        (Command::OpenImages, &bindings.images),
        (Command::Edit, &bindings.edit),
    ]
}

fn build(defaults: Vec<(Command, Vec<KeyInput>)>, bindings: &KeyBindings) -> HashMap<KeyInput, Command> {
    let mut table: HashMap<Command, Vec<KeyInput>> = defaults.into_iter().collect();
    for (command, keys) in overrides(bindings) {
        if let Some(keys) = keys {
            table.insert(command, keys.clone());
        }
    }

    let mut map = HashMap::new();
    for (command, keys) in table {
        for key in keys {
            if let Some(previous) = map.insert(key, command) {
                tracing::warn!("Key '{}' bound to both {:?} and {:?}", key, previous, command);
            }
        }
    }
    map
}

impl Keymap {
    pub fn from_config(keys: &KeysConfig) -> Self {
        Self {
            toc: build(default_toc(), &keys.toc),
            chapter: build(default_chapter(), &keys.chapter),
        }
    }

    pub fn toc_command(&self, key: KeyInput) -> Option<Command> {
        if key == KeyInput::Interrupt {
            return Some(Command::Quit);
        }
        self.toc.get(&key).copied()
    }

    pub fn chapter_command(&self, key: KeyInput) -> Option<Command> {
        if key == KeyInput::Interrupt {
            return Some(Command::Quit);
        }
        self.chapter.get(&key).copied()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeysConfig::default())
    }
}
