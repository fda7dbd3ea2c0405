use serde::{Deserialize, Serialize};

/// One row of the table of contents. The first row of a book is its title
/// and has no source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub src: Option<String>,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, src: Option<String>) -> Self {
        Self {
            title: title.into(),
            src,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: String,
    pub alt: String,
}

/// A content document rendered to display lines.
///
/// `images` pairs each image marker with the index of the line carrying it.
#[derive(Debug, Clone, Default)]
pub struct Chapter {
    pub lines: Vec<String>,
    pub images: Vec<(usize, ImageRef)>,
}

impl Chapter {
    pub fn new(lines: Vec<String>, images: Vec<(usize, ImageRef)>) -> Self {
        Self { lines, images }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Images on lines `start..end`.
    pub fn images_in(&self, start: usize, end: usize) -> impl Iterator<Item = &ImageRef> {
        self.images
            .iter()
            .filter(move |(row, _)| (start..end).contains(row))
            .map(|(_, image)| image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Bold,
    Reverse,
}
