use crate::domain::ports::Launcher;
use crate::utils::error::{ReaderError, Result};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::{Builder, NamedTempFile, TempDir};

/// Runs the configured editor and image viewer as child processes.
///
/// Images handed to the viewer outlive the call and are collected in one
/// directory that is removed when the launcher is dropped.
#[derive(Debug)]
pub struct ProcessLauncher {
    editor: String,
    image_viewer: String,
    image_dir: Option<TempDir>,
}

impl ProcessLauncher {
    pub fn new(editor: impl Into<String>, image_viewer: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
            image_viewer: image_viewer.into(),
            image_dir: None,
        }
    }

    /// Directory holding the images shown so far, once one was shown.
    pub fn image_dir(&self) -> Option<&Path> {
        self.image_dir.as_ref().map(|dir| dir.path())
    }

    fn temp_file(suffix: &str, data: &[u8], dir: Option<&Path>) -> Result<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix("threepub-").suffix(suffix);
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(data)?;
        file.flush()?;
        Ok(file)
    }
}

/// Run `command_line` with `path` appended and wait for it to exit.
pub fn run_program(command_line: &str, path: &Path) -> Result<()> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or_else(|| ReaderError::MissingConfigError {
        field: "program".to_string(),
    })?;

    tracing::debug!("Running {} on {}", command_line, path.display());
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| ReaderError::ExternalProgram {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    if !status.success() {
        return Err(ReaderError::ExternalProgram {
            program: program.to_string(),
            message: format!("exited with {}", status),
        });
    }
    Ok(())
}

impl Launcher for ProcessLauncher {
    fn show_image(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let suffix = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        if self.image_dir.is_none() {
            self.image_dir = Some(Builder::new().prefix("threepub-images-").tempdir()?);
        }
        let file = Self::temp_file(&suffix, data, self.image_dir())?;
        // viewers like xdg-open return before they read the file
        let (_, path) = file.keep().map_err(|e| ReaderError::IoError(e.error))?;
        tracing::info!("Image {} written to {}", name, path.display());

        run_program(&self.image_viewer, &path)
    }

    fn edit(&mut self, content: &[u8]) -> Result<Option<Vec<u8>>> {
        let file = Self::temp_file(".html", content, None)?;
        run_program(&self.editor, file.path())?;

        let edited = std::fs::read(file.path())?;
        if edited == content {
            Ok(None)
        } else {
            Ok(Some(edited))
        }
    }
}
