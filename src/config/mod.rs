pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_existing_file, validate_file_extensions, validate_path, validate_positive_number,
    Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "threepub")]
#[command(about = "Terminal EPUB reader")]
#[command(after_help = "Keyboard commands:
    Esc/q          - quit
    Tab/Left/Right - toggle between TOC and chapter views
    TOC view:
        Up         - up a line
        Down       - down a line
        PgUp       - up a page
        PgDown     - down a page
    Chapter view:
        Up         - up a page
        Down       - down a page
        PgUp       - up a line
        PgDown     - down a line
        i          - open images on page in the image viewer
        e          - open chapter HTML in the editor")]
pub struct CliConfig {
    #[arg(value_name = "EPUB", default_value = "ebook.epub", help = "EPUB file to view")]
    pub epub: String,

    #[arg(short = 'd', long, help = "Dump EPUB to text")]
    pub dump: bool,

    #[arg(
        short = 'c',
        long,
        help = "Number of columns to wrap; default is no wrapping"
    )]
    pub cols: Option<usize>,

    #[arg(long, value_name = "PATH", help = "Settings file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_name = "PATH", help = "Write logs to this file")]
    pub log_file: Option<PathBuf>,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validate_path("epub", &self.epub)?;
        validate_existing_file("epub", &self.epub)?;
        validate_file_extensions("epub", std::slice::from_ref(&self.epub), &["epub"])?;

        if let Some(cols) = self.cols {
            validate_positive_number("cols", cols, 1)?;
        }
        Ok(())
    }
}
