use crate::utils::error::{OrchestrationError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OrchestrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OrchestrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 專案目錄必須是工作區下的單一相對名稱
pub fn validate_directory_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;

    let path = std::path::Path::new(name);
    if path.is_absolute() || path.components().count() != 1 || name == ".." || name == "." {
        return Err(OrchestrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a single relative directory name".to_string(),
        });
    }

    Ok(())
}

pub fn validate_command(field_name: &str, command: &[String]) -> Result<()> {
    match command.first() {
        None => Err(OrchestrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "Command cannot be empty".to_string(),
        }),
        Some(program) => validate_non_empty_string(field_name, program),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| OrchestrationError::ConfigurationMissing {
            key: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrchestrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
