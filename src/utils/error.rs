use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("XML parsing failed: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Not an EPUB file: {path}")]
    NotAnEpub { path: String },

    #[error("Archive entry not found: {name}")]
    EntryNotFound { name: String },

    #[error("Malformed EPUB package: {message}")]
    MalformedPackage { message: String },

    #[error("External program '{program}' failed: {message}")]
    ExternalProgram { program: String, message: String },

    #[error("Terminal error: {message}")]
    TerminalError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Package,
    Configuration,
    External,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReaderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReaderError::NotAnEpub { .. } => ErrorCategory::Input,
            ReaderError::ZipError(_)
            | ReaderError::XmlError(_)
            | ReaderError::EntryNotFound { .. }
            | ReaderError::MalformedPackage { .. } => ErrorCategory::Package,
            ReaderError::ConfigError { .. }
            | ReaderError::ConfigValidationError { .. }
            | ReaderError::InvalidConfigValueError { .. }
            | ReaderError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReaderError::ExternalProgram { .. } => ErrorCategory::External,
            ReaderError::IoError(_) | ReaderError::TerminalError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::External => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Package | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReaderError::NotAnEpub { path } => {
                format!("'{}' is not a readable .epub file", path)
            }
            ReaderError::ZipError(_) => "The book could not be opened as a zip archive".to_string(),
            ReaderError::XmlError(e) => format!("The book's package files are not valid XML: {}", e),
            ReaderError::EntryNotFound { name } => {
                format!("The book is missing a required file: {}", name)
            }
            ReaderError::MalformedPackage { message } => {
                format!("The book's package document is broken: {}", message)
            }
            ReaderError::ExternalProgram { program, message } => {
                format!("Could not run '{}': {}", program, message)
            }
            ReaderError::IoError(e) => format!("File system error: {}", e),
            ReaderError::TerminalError { message } => format!("Terminal error: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Pass the path of an existing file ending in .epub",
            ErrorCategory::Package => {
                "The EPUB may be damaged or DRM-protected; try re-exporting it"
            }
            ErrorCategory::Configuration => {
                "Check the command line flags and the settings file (see --help)"
            }
            ErrorCategory::External => {
                "Set [programs] editor/image_viewer in the settings file to an installed program"
            }
            ErrorCategory::System => "Make sure the terminal is interactive and the disk is writable",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_an_epub_is_high_severity_input() {
        let err = ReaderError::NotAnEpub {
            path: "book.pdf".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("book.pdf"));
    }

    #[test]
    fn test_external_program_failure_is_retryable() {
        let err = ReaderError::ExternalProgram {
            program: "vim".to_string(),
            message: "exit status 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::External);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: ReaderError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
