use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error(
        "No API key configured. Pass --api-key or set GEMINI_API_KEY. \
         Get one at https://aistudio.google.com/apikey"
    )]
    MissingApiKey,

    #[error("Failed to parse AI response as JSON. Raw response:\n{raw}")]
    ResponseParseError { raw: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Invalid dice expression '{input}': {reason}")]
    DiceParseError { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Storage,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DmError::ApiError(_)
            | DmError::ApiStatusError { .. }
            | DmError::ResponseParseError { .. } => ErrorCategory::Network,
            DmError::ConfigError { .. }
            | DmError::ConfigValidationError { .. }
            | DmError::InvalidConfigValueError { .. }
            | DmError::MissingConfigError { .. }
            | DmError::MissingApiKey => ErrorCategory::Configuration,
            DmError::IoError(_) | DmError::SerializationError(_) => ErrorCategory::Storage,
            DmError::ValidationError { .. }
            | DmError::NotFound { .. }
            | DmError::DiceParseError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 遠端錯誤通常可以重試
            DmError::ApiError(_)
            | DmError::ApiStatusError { .. }
            | DmError::ResponseParseError { .. } => ErrorSeverity::Medium,
            DmError::IoError(_) | DmError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DmError::ApiError(_) => "Check your network connection and try again",
            DmError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check that your Gemini API key is valid"
            }
            DmError::ApiStatusError { status, .. } if *status == 429 => {
                "Rate limited by the API, wait a moment and retry"
            }
            DmError::ApiStatusError { .. } => "The AI service returned an error, retry later",
            DmError::ResponseParseError { .. } => {
                "The AI answered in an unexpected format, try generating again"
            }
            DmError::MissingApiKey => {
                "Set GEMINI_API_KEY or pass --api-key (https://aistudio.google.com/apikey)"
            }
            DmError::ConfigError { .. }
            | DmError::ConfigValidationError { .. }
            | DmError::InvalidConfigValueError { .. }
            | DmError::MissingConfigError { .. } => "Review your dm-toolkit.toml settings",
            DmError::IoError(_) => "Check that the data directory exists and is writable",
            DmError::SerializationError(_) => "A data file may be corrupted, inspect or remove it",
            DmError::ValidationError { .. } => "Fix the highlighted value and run the command again",
            DmError::NotFound { .. } => "Use the matching list command to see available entries",
            DmError::DiceParseError { .. } => "Use the NdM+K form, e.g. 2d6+3 or d20",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DmError::ApiError(e) if e.is_timeout() => "The AI service timed out".to_string(),
            DmError::ApiError(_) => "Could not reach the AI service".to_string(),
            DmError::IoError(e) => format!("File operation failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DmError>;
