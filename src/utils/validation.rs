use crate::utils::error::{ReaderError, Result};
use std::collections::HashSet;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ReaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_existing_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !Path::new(path).is_file() {
        return Err(ReaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "File does not exist or is not a regular file".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ReaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Extensions are compared case-insensitively, so `BOOK.EPUB` passes for `epub`.
pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<String> = allowed_extensions
        .iter()
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    for file in files {
        if let Some(extension) = Path::new(file).extension().and_then(|ext| ext.to_str()) {
            if !allowed_set.contains(&extension.to_ascii_lowercase()) {
                return Err(ReaderError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(ReaderError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
