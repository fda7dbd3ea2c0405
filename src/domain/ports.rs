use crate::domain::keys::KeyInput;
use crate::domain::model::LineStyle;
use crate::utils::error::Result;

/// Read access to the members of a book archive.
pub trait EntrySource {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>>;
}

/// The terminal the viewer draws on. Rows and columns are zero-based.
pub trait Screen {
    /// `(rows, cols)`
    fn size(&self) -> (usize, usize);
    fn clear(&mut self) -> Result<()>;
    fn put_line(&mut self, row: usize, text: &str, style: LineStyle) -> Result<()>;
    fn place_cursor(&mut self, row: usize) -> Result<()>;
    fn set_cursor_visible(&mut self, visible: bool) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn read_key(&mut self) -> Result<KeyInput>;
}

/// External programs the viewer hands content to.
pub trait Launcher {
    fn show_image(&mut self, name: &str, data: &[u8]) -> Result<()>;

    /// Returns the edited content when it differs from `content`.
    fn edit(&mut self, content: &[u8]) -> Result<Option<Vec<u8>>>;
}
