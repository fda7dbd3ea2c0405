use crate::core::epub::parent_dir;
use crate::core::keymap::Keymap;
use crate::core::reader::{Outcome, ReaderState, View};
use crate::core::textify::{chapter_body, render_chapter, textify};
use crate::domain::model::{Chapter, ImageRef, LineStyle, TocEntry};
use crate::domain::ports::{EntrySource, Launcher, Screen};
use crate::utils::error::{ReaderError, Result};

pub const IMAGE_NOT_FOUND: &str = "image not found";
pub const CHAPTER_NOT_FOUND: &str = "chapter not found";

/// Interactive table of contents and chapter pager.
pub struct Viewer<E: EntrySource, S: Screen, L: Launcher> {
    source: E,
    screen: S,
    launcher: L,
    keymap: Keymap,
    toc: Vec<TocEntry>,
    state: ReaderState,
    chapter: Chapter,
    chapter_html: Option<String>,
    status: Option<String>,
    size: (usize, usize),
}

impl<E: EntrySource, S: Screen, L: Launcher> Viewer<E, S, L> {
    pub fn new(source: E, toc: Vec<TocEntry>, screen: S, launcher: L, keymap: Keymap) -> Self {
        let state = ReaderState::new(toc.len());
        Self {
            source,
            screen,
            launcher,
            keymap,
            toc,
            state,
            chapter: Chapter::default(),
            chapter_html: None,
            status: None,
            size: (0, 0),
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Viewer started with {} entries", self.toc.len());
        self.screen.clear()?;
        self.size = self.screen.size();

        loop {
            let keep_going = match self.state.view() {
                View::Toc => self.toc_step()?,
                View::Chapter => self.chapter_step()?,
            };
            if !keep_going {
                break;
            }
        }

        self.screen.clear()?;
        self.screen.set_cursor_visible(true)?;
        self.screen.flush()?;
        tracing::info!("Viewer closed");
        Ok(())
    }

    /// Current screen height. A resized screen is cleared before it is redrawn.
    fn height(&mut self) -> Result<usize> {
        let size = self.screen.size();
        if size != self.size {
            tracing::debug!("Screen resized to {}x{}", size.0, size.1);
            self.size = size;
            self.screen.clear()?;
        }
        Ok(size.0.max(1))
    }

    fn draw_status(&mut self) -> Result<()> {
        if let Some(status) = self.status.take() {
            self.screen.put_line(0, &status, LineStyle::Reverse)?;
        }
        Ok(())
    }

    fn draw_toc(&mut self, height: usize) -> Result<()> {
        let start = self.state.start();
        for (row, entry) in self.toc.iter().skip(start).take(height).enumerate() {
            let index = start + row;
            if index == 0 {
                self.screen
                    .put_line(row, &format!("      {}", entry.title), LineStyle::Bold)?;
            } else {
                self.screen.put_line(
                    row,
                    &format!("{:5} {}", index, entry.title.trim()),
                    LineStyle::Plain,
                )?;
            }
        }
        Ok(())
    }

    fn toc_step(&mut self) -> Result<bool> {
        let height = self.height()?;
        self.state.fit_viewport(height);

        self.screen.set_cursor_visible(true)?;
        self.draw_toc(height)?;
        self.draw_status()?;
        self.screen.place_cursor(self.state.cursor_row())?;
        self.screen.flush()?;

        let key = self.screen.read_key()?;
        let Some(command) = self.keymap.toc_command(key) else {
            return Ok(true);
        };

        match self.state.apply(command, height) {
            Outcome::Quit => return Ok(false),
            Outcome::OpenChapter(index) => self.open_chapter(index)?,
            Outcome::Redraw => self.screen.clear()?,
            _ => {}
        }
        Ok(true)
    }

    fn open_chapter(&mut self, index: usize) -> Result<()> {
        let (_, cols) = self.screen.size();
        let src = self.toc.get(index).and_then(|entry| entry.src.clone());

        match src {
            Some(src) => {
                let bytes = match self.source.read_entry(&src) {
                    Ok(bytes) => bytes,
                    Err(ReaderError::EntryNotFound { name }) => {
                        tracing::warn!("Chapter {} missing from archive", name);
                        self.status = Some(CHAPTER_NOT_FOUND.to_string());
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                };
                let html = String::from_utf8_lossy(&bytes).into_owned();
                // the screen keeps its last column free
                let maxcol = cols.saturating_sub(1).max(1);
                let text = textify(chapter_body(&html), parent_dir(&src), Some(maxcol));
                self.chapter = render_chapter(&text);
                self.chapter_html = Some(html);
                tracing::debug!("Opened {} ({} lines)", src, self.chapter.len());
            }
            None => {
                self.chapter = Chapter::default();
                self.chapter_html = None;
            }
        }

        self.state.enter_chapter(self.chapter.len());
        self.screen.clear()?;
        Ok(())
    }

    fn chapter_step(&mut self) -> Result<bool> {
        let height = self.height()?;
        let pos = self.state.position();

        self.screen.set_cursor_visible(false)?;
        for (row, line) in self.chapter.lines.iter().skip(pos).take(height).enumerate() {
            self.screen.put_line(row, line, LineStyle::Plain)?;
        }
        self.draw_status()?;
        self.screen.flush()?;

        let key = self.screen.read_key()?;
        let Some(command) = self.keymap.chapter_command(key) else {
            return Ok(true);
        };

        match self.state.apply(command, height) {
            Outcome::Quit => return Ok(false),
            Outcome::CloseChapter => {
                self.state.leave_chapter();
                self.screen.clear()?;
            }
            Outcome::Redraw => self.screen.clear()?,
            Outcome::OpenImages => {
                let images: Vec<ImageRef> =
                    self.chapter.images_in(pos, pos + height).cloned().collect();
                self.open_images(&images)?
            }
            Outcome::Edit => {
                self.edit_chapter()?;
                self.state.leave_chapter();
                self.screen.clear()?;
            }
            _ => {}
        }
        Ok(true)
    }

    fn open_images(&mut self, images: &[ImageRef]) -> Result<()> {
        if images.is_empty() {
            tracing::debug!("No images on this page");
            return Ok(());
        }

        for image in images {
            let data = match self.source.read_entry(&image.path) {
                Ok(data) => data,
                Err(ReaderError::EntryNotFound { .. }) => {
                    tracing::warn!("Image {} not found in archive", image.path);
                    self.status = Some(IMAGE_NOT_FOUND.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };

            tracing::info!("Showing image {} ({} bytes)", image.path, data.len());
            if let Err(e) = self.launcher.show_image(&image.path, &data) {
                tracing::warn!("Image viewer failed: {}", e);
                self.status = Some(e.user_friendly_message());
            }
        }

        self.screen.clear()?;
        Ok(())
    }

    fn edit_chapter(&mut self) -> Result<()> {
        let Some(html) = &self.chapter_html else {
            return Ok(());
        };

        match self.launcher.edit(html.as_bytes()) {
            Ok(Some(changed)) => {
                tracing::warn!(
                    "Chapter edited ({} bytes); edits are not written back to the archive",
                    changed.len()
                );
            }
            Ok(None) => tracing::debug!("Chapter left unchanged by editor"),
            Err(e) => {
                tracing::warn!("Editor failed: {}", e);
                self.status = Some(e.user_friendly_message());
            }
        }
        Ok(())
    }
}
