use crate::domain::keys::KeyInput;
use crate::utils::error::{ReaderError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_EDITOR: &str = "vim";
pub const DEFAULT_IMAGE_VIEWER: &str = "xdg-open";
const SETTINGS_DIR: &str = "threepub";
const SETTINGS_FILE: &str = "config.toml";

/// Optional settings file. Every section and field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    pub keys: KeysConfig,
    pub programs: ProgramsConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub toc: KeyBindings,
    pub chapter: KeyBindings,
}

/// Keys per command. A listed command replaces its default keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyBindings {
    pub quit: Option<Vec<KeyInput>>,
    pub line_up: Option<Vec<KeyInput>>,
    pub line_down: Option<Vec<KeyInput>>,
    pub page_up: Option<Vec<KeyInput>>,
    pub page_down: Option<Vec<KeyInput>>,
    pub switch: Option<Vec<KeyInput>>,
    pub images: Option<Vec<KeyInput>>,
    pub edit: Option<Vec<KeyInput>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramsConfig {
    pub editor: Option<String>,
    pub image_viewer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub cols: Option<usize>,
}

impl ProgramsConfig {
    /// `editor` setting, then `$VISUAL`, then `$EDITOR`, then vim.
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|editor| !editor.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
    }

    pub fn image_viewer(&self) -> String {
        self.image_viewer
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_VIEWER.to_string())
    }
}

impl ReaderSettings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReaderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReaderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EDITOR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReaderError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let settings = match explicit {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_file(path)?
            }
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => {
                    tracing::debug!("Loading settings from {}", path.display());
                    Self::from_file(path)?
                }
                None => {
                    tracing::debug!("No settings file; using defaults");
                    Self::default()
                }
            },
        };

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for ReaderSettings {
    fn validate(&self) -> Result<()> {
        if let Some(cols) = self.display.cols {
            validate_positive_number("display.cols", cols, 1)?;
        }
        if let Some(editor) = &self.programs.editor {
            validate_non_empty_string("programs.editor", editor)?;
        }
        if let Some(viewer) = &self.programs.image_viewer {
            validate_non_empty_string("programs.image_viewer", viewer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = ReaderSettings::from_toml_str("").unwrap();
        assert!(settings.keys.toc.quit.is_none());
        assert!(settings.display.cols.is_none());
        assert_eq!(settings.programs.image_viewer(), DEFAULT_IMAGE_VIEWER);
    }

    #[test]
    fn test_full_settings() {
        let settings = ReaderSettings::from_toml_str(
            r#"
[keys.toc]
line_down = ["down", "j"]
quit = ["q"]

[keys.chapter]
page_down = ["space", "down"]

[programs]
editor = "nano"
image_viewer = "feh --scale-down"

[display]
cols = 72
"#,
        )
        .unwrap();

        assert_eq!(
            settings.keys.toc.line_down,
            Some(vec![KeyInput::Down, KeyInput::Char('j')])
        );
        assert_eq!(
            settings.keys.chapter.page_down,
            Some(vec![KeyInput::Char(' '), KeyInput::Down])
        );
        assert_eq!(settings.programs.editor(), "nano");
        assert_eq!(settings.programs.image_viewer(), "feh --scale-down");
        assert_eq!(settings.display.cols, Some(72));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_name_is_a_config_error() {
        let err = ReaderSettings::from_toml_str("[keys.toc]\nquit = [\"hyperspace\"]\n").unwrap_err();
        assert!(matches!(err, ReaderError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_unknown_binding_is_rejected() {
        let err = ReaderSettings::from_toml_str("[keys.toc]\nline_dwn = [\"j\"]\n").unwrap_err();
        assert!(matches!(err, ReaderError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("THREEPUB_TEST_VIEWER", "sxiv");
        let settings =
            ReaderSettings::from_toml_str("[programs]\nimage_viewer = \"${THREEPUB_TEST_VIEWER}\"\n")
                .unwrap();
        assert_eq!(settings.programs.image_viewer(), "sxiv");
    }

    #[test]
    fn test_zero_cols_fails_validation() {
        let settings = ReaderSettings::from_toml_str("[display]\ncols = 0\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[display]\ncols = 40\n").unwrap();

        let settings = ReaderSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.display.cols, Some(40));

        let missing = temp_dir.path().join("missing.toml");
        assert!(ReaderSettings::load(Some(&missing)).is_err());
    }
}
