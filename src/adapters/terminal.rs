use crate::domain::keys::KeyInput;
use crate::domain::model::LineStyle;
use crate::domain::ports::Screen;
use crate::utils::error::{ReaderError, Result};
use console::{style, Key, Term};

/// `Screen` on top of a `console::Term`.
pub struct ConsoleScreen {
    term: Term,
}

impl ConsoleScreen {
    pub fn stdout() -> Result<Self> {
        let term = Term::stdout();
        if !term.is_term() {
            return Err(ReaderError::TerminalError {
                message: "stdout is not a terminal; use --dump to print the book".to_string(),
            });
        }
        Ok(Self { term })
    }
}

pub fn key_input(key: Key) -> KeyInput {
    match key {
        Key::ArrowUp => KeyInput::Up,
        Key::ArrowDown => KeyInput::Down,
        Key::ArrowLeft => KeyInput::Left,
        Key::ArrowRight => KeyInput::Right,
        Key::PageUp => KeyInput::PageUp,
        Key::PageDown => KeyInput::PageDown,
        Key::Home => KeyInput::Home,
        Key::End => KeyInput::End,
        Key::Tab => KeyInput::Tab,
        Key::Enter => KeyInput::Enter,
        Key::Escape => KeyInput::Escape,
        Key::Backspace => KeyInput::Backspace,
        Key::CtrlC => KeyInput::Interrupt,
        Key::Char('\u{3}') => KeyInput::Interrupt,
        Key::Char('\t') => KeyInput::Tab,
        Key::Char('\u{1b}') => KeyInput::Escape,
        Key::Char(c) => KeyInput::Char(c),
        _ => KeyInput::Unknown,
    }
}

/// The first `cols` characters of `text`.
pub fn fit_width(text: &str, cols: usize) -> String {
    text.chars().take(cols).collect()
}

impl Screen for ConsoleScreen {
    fn size(&self) -> (usize, usize) {
        let (rows, cols) = self.term.size();
        (rows as usize, cols as usize)
    }

    fn clear(&mut self) -> Result<()> {
        self.term.clear_screen()?;
        Ok(())
    }

    fn put_line(&mut self, row: usize, text: &str, line_style: LineStyle) -> Result<()> {
        let (_, cols) = self.size();
        // the last column is left free so the terminal never auto-wraps
        let text = fit_width(text, cols.saturating_sub(1));

        self.term.move_cursor_to(0, row)?;
        self.term.clear_line()?;
        match line_style {
            LineStyle::Plain => self.term.write_str(&text)?,
            LineStyle::Bold => self.term.write_str(&style(text).bold().to_string())?,
            LineStyle::Reverse => self.term.write_str(&style(text).reverse().to_string())?,
        }
        Ok(())
    }

    fn place_cursor(&mut self, row: usize) -> Result<()> {
        self.term.move_cursor_to(0, row)?;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            self.term.show_cursor()?;
        } else {
            self.term.hide_cursor()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.term.flush()?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<KeyInput> {
        match self.term.read_key() {
            Ok(key) => Ok(key_input(key)),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Ok(KeyInput::Interrupt),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for ConsoleScreen {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
    }
}
