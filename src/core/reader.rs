use crate::domain::keys::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Toc,
    Chapter,
}

/// What the viewer has to do after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Unchanged,
    OpenChapter(usize),
    CloseChapter,
    OpenImages,
    Edit,
    Quit,
}

/// Scroll and cursor state of the table of contents plus a remembered
/// line position for every entry.
#[derive(Debug, Clone)]
pub struct ReaderState {
    entries: usize,
    view: View,
    start: usize,
    cursor_row: usize,
    positions: Vec<usize>,
    chapter_lines: usize,
}

impl ReaderState {
    pub fn new(entries: usize) -> Self {
        Self {
            entries,
            view: View::Toc,
            start: 0,
            cursor_row: 0,
            positions: vec![0; entries],
            chapter_lines: 0,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    pub fn selected(&self) -> usize {
        self.start + self.cursor_row
    }

    pub fn position(&self) -> usize {
        self.positions.get(self.selected()).copied().unwrap_or(0)
    }

    /// Index of the last TOC row visible with `height` rows.
    fn last_drawn(&self, height: usize) -> usize {
        height
            .min(self.entries.saturating_sub(self.start))
            .saturating_sub(1)
    }

    /// Keep the cursor inside the viewport and on an existing entry.
    pub fn fit_viewport(&mut self, height: usize) {
        let height = height.max(1);
        if self.cursor_row >= height {
            self.cursor_row = height - 1;
        }
        self.cursor_row = self.cursor_row.min(self.last_drawn(height));
    }

    pub fn enter_chapter(&mut self, lines: usize) {
        self.view = View::Chapter;
        self.chapter_lines = lines;
    }

    pub fn leave_chapter(&mut self) {
        self.view = View::Toc;
    }

    pub fn apply(&mut self, command: Command, height: usize) -> Outcome {
        let height = height.max(1);
        match self.view {
            View::Toc => self.apply_toc(command, height),
            View::Chapter => self.apply_chapter(command, height),
        }
    }

    fn apply_toc(&mut self, command: Command, maxy: usize) -> Outcome {
        let len = self.entries;
        match command {
            Command::Quit => Outcome::Quit,
            Command::LineDown => {
                if self.start + maxy < len {
                    self.start += 1;
                    Outcome::Redraw
                } else if self.cursor_row < maxy - 1 && self.cursor_row < self.last_drawn(maxy) {
                    self.cursor_row += 1;
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::LineUp => {
                if self.start > 0 {
                    self.start -= 1;
                    Outcome::Redraw
                } else if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::PageDown => {
                if self.start + maxy - 1 < len {
                    let last_start = len.saturating_sub(maxy);
                    let next = (self.start + maxy - 1).min(last_start);
                    if next == self.start {
                        return Outcome::Unchanged;
                    }
                    self.start = next;
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::PageUp => {
                if self.start > 0 {
                    self.start = self.start.saturating_sub(maxy - 1);
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::SwitchView => {
                if self.selected() < len {
                    Outcome::OpenChapter(self.selected())
                } else {
                    Outcome::Unchanged
                }
            }
            Command::OpenImages | Command::Edit => Outcome::Unchanged,
        }
    }

    fn apply_chapter(&mut self, command: Command, maxy: usize) -> Outcome {
        let lines = self.chapter_lines;
        let selected = self.selected();
        let Some(pos) = self.positions.get_mut(selected) else {
            return Outcome::CloseChapter;
        };

        match command {
            Command::Quit => Outcome::Quit,
            Command::SwitchView => Outcome::CloseChapter,
            Command::PageDown => {
                if *pos + maxy - 1 < lines && maxy > 1 {
                    *pos += maxy - 1;
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::PageUp => {
                if *pos > 0 {
                    *pos = pos.saturating_sub(maxy - 1);
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::LineDown => {
                if *pos + maxy - 1 < lines {
                    *pos += 1;
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::LineUp => {
                if *pos > 0 {
                    *pos -= 1;
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::OpenImages => Outcome::OpenImages,
            Command::Edit => Outcome::Edit,
        }
    }
}
