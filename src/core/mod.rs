pub mod dump;
pub mod epub;
pub mod keymap;
pub mod markup;
pub mod reader;
pub mod textify;
pub mod viewer;

pub use crate::domain::keys::{Command, KeyInput};
pub use crate::domain::model::{Chapter, ImageRef, LineStyle, TocEntry};
pub use crate::domain::ports::{EntrySource, Launcher, Screen};
pub use crate::utils::error::Result;
