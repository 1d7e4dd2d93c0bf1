use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Required configuration value missing: {key}")]
    ConfigurationMissing { key: String },

    #[error("Scaffold step failed (exit code: {}): {details}", fmt_code(.exit_code))]
    ScaffoldFailed {
        exit_code: Option<i32>,
        details: String,
    },

    #[error("Install step failed (exit code: {}): {details}", fmt_code(.exit_code))]
    InstallFailed {
        exit_code: Option<i32>,
        details: String,
    },

    #[error("Customize step failed: {message}")]
    CustomizeFailed {
        exit_code: Option<i32>,
        message: String,
    },

    #[error("Build step failed (exit code: {}): {details}", fmt_code(.exit_code))]
    BuildFailed {
        exit_code: Option<i32>,
        details: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid run state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ExternalCommand,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OrchestrationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrchestrationError::ConfigurationMissing { .. }
            | OrchestrationError::ConfigValidationError { .. }
            | OrchestrationError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            OrchestrationError::ScaffoldFailed { .. }
            | OrchestrationError::InstallFailed { .. }
            | OrchestrationError::CustomizeFailed { .. }
            | OrchestrationError::BuildFailed { .. } => ErrorCategory::ExternalCommand,
            OrchestrationError::InvalidStateTransition { .. }
            | OrchestrationError::IoError(_)
            | OrchestrationError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::ExternalCommand => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 失敗步驟的名稱（非步驟錯誤回傳 None）
    pub fn failed_step(&self) -> Option<&'static str> {
        match self {
            OrchestrationError::ScaffoldFailed { .. } => Some("scaffold"),
            OrchestrationError::InstallFailed { .. } => Some("install"),
            OrchestrationError::CustomizeFailed { .. } => Some("customize"),
            OrchestrationError::BuildFailed { .. } => Some("build"),
            _ => None,
        }
    }

    /// 外部命令的退出碼
    pub fn command_exit_code(&self) -> Option<i32> {
        match self {
            OrchestrationError::ScaffoldFailed { exit_code, .. }
            | OrchestrationError::InstallFailed { exit_code, .. }
            | OrchestrationError::CustomizeFailed { exit_code, .. }
            | OrchestrationError::BuildFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// 進程退出碼：優先沿用子進程的退出碼，否則依嚴重程度決定
    pub fn exit_code(&self) -> i32 {
        if let Some(code) = self.command_exit_code() {
            if (1..=255).contains(&code) {
                return code;
            }
        }

        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            OrchestrationError::ConfigurationMissing { key } => format!(
                "Set {} in the environment, a .env file, the config file, or pass --site",
                key
            ),
            OrchestrationError::ScaffoldFailed { .. } => {
                "Check that npx is installed and the registry is reachable, then re-run; an existing project directory is reused".to_string()
            }
            OrchestrationError::InstallFailed { .. } => {
                "Inspect the package manager output above, fix package.json or network access, then re-run".to_string()
            }
            OrchestrationError::CustomizeFailed { .. } => {
                "Fix the customization command and re-run; scaffold will be skipped".to_string()
            }
            OrchestrationError::BuildFailed { .. } => {
                "Fix the build errors reported above and re-run".to_string()
            }
            OrchestrationError::ConfigValidationError { .. }
            | OrchestrationError::InvalidConfigValueError { .. } => {
                "Correct the configuration file or command line flags".to_string()
            }
            OrchestrationError::InvalidStateTransition { .. } => {
                "This is an internal error; please report it".to_string()
            }
            OrchestrationError::IoError(_) => {
                "Check file permissions and that the workspace root exists".to_string()
            }
            OrchestrationError::SerializationError(_) => {
                "Check that the summary path is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OrchestrationError::ConfigurationMissing { key } => {
                format!("Missing required setting {}", key)
            }
            OrchestrationError::ScaffoldFailed { .. } => {
                "Could not create the project scaffold".to_string()
            }
            OrchestrationError::InstallFailed { .. } => {
                "Dependency installation failed".to_string()
            }
            OrchestrationError::CustomizeFailed { message, .. } => {
                format!("Site customization failed: {}", message)
            }
            OrchestrationError::BuildFailed { .. } => "Project build failed".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestrationError>;
