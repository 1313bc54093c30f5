use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Lead request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Lead submission rejected with status {status}")]
    SubmissionRejected { status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Unsupported selector `{selector}`: {reason}")]
    UnsupportedSelector { selector: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No async runtime available: {message}")]
    RuntimeUnavailable { message: String },
}

/// 錯誤分類，對應表單驗證、傳輸、DOM 解析與設定四種來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Resolution,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::MissingFields { .. } => ErrorCategory::Validation,
            SiteError::HttpError(_) | SiteError::SubmissionRejected { .. } => {
                ErrorCategory::Transport
            }
            SiteError::ElementNotFound { .. } | SiteError::UnsupportedSelector { .. } => {
                ErrorCategory::Resolution
            }
            SiteError::ConfigError { .. } | SiteError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SiteError::IoError(_)
            | SiteError::SerializationError(_)
            | SiteError::RuntimeUnavailable { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Resolution => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::MissingFields { .. } => "Please fill in all required fields.".to_string(),
            SiteError::HttpError(_) | SiteError::SubmissionRejected { .. } => {
                "Something went wrong. Please try calling us directly.".to_string()
            }
            SiteError::ElementNotFound { selector } => {
                format!("Page element `{}` is missing", selector)
            }
            SiteError::UnsupportedSelector { selector, .. } => {
                format!("Selector `{}` is not supported", selector)
            }
            SiteError::ConfigError { message } => format!("Invalid configuration: {}", message),
            SiteError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration value for `{}`: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Fill in name, email and message, then submit again",
            ErrorCategory::Transport => {
                "Check that the lead endpoint is reachable and returns a 2xx status"
            }
            ErrorCategory::Resolution => "Check the page markup against the expected selectors",
            ErrorCategory::Configuration => "Fix the configuration file and run check-config",
            ErrorCategory::System => "Retry; if it persists, inspect the logs with --verbose",
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
