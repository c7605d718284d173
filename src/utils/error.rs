use serde::Serialize;
use thiserror::Error;

/// 單一欄位的驗證錯誤
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn summarize_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Corrupt record in {table}: {message}")]
    CorruptRecordError { table: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Remote call failed with status {status}: {message}")]
    RemoteError { status: u16, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation failed: {}", summarize_fields(.errors))]
    ValidationError { errors: Vec<FieldError> },

    #[error("{entity} not found: {id}")]
    NotFoundError { entity: String, id: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaTypeError { content_type: String },

    #[error("Payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLargeError { size: usize, limit: usize },

    #[error("Version conflict on {collection}: expected {expected}, found {actual}")]
    VersionConflictError {
        collection: String,
        expected: u64,
        actual: u64,
    },

    #[error("Object storage error: {message}")]
    StorageError { message: String },

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Authorization,
    Persistence,
    Storage,
    Network,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    /// 建立單一欄位的驗證錯誤
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        AppError::NotFoundError {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// 排序版本衝突，不論是本地判定或遠端回傳 409
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::VersionConflictError { .. } | AppError::RemoteError { status: 409, .. }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::ValidationError { .. }
            | AppError::NotFoundError { .. }
            | AppError::UnsupportedMediaTypeError { .. }
            | AppError::PayloadTooLargeError { .. }
            | AppError::VersionConflictError { .. } => ErrorCategory::Validation,
            AppError::Unauthorized => ErrorCategory::Authorization,
            AppError::DatabaseError(_) | AppError::CorruptRecordError { .. } => {
                ErrorCategory::Persistence
            }
            AppError::StorageError { .. } | AppError::IoError(_) => ErrorCategory::Storage,
            AppError::HttpError(_) | AppError::RemoteError { .. } => ErrorCategory::Network,
            AppError::SerializationError(_) | AppError::TaskError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Authorization => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Persistence | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 給使用者看的訊息，不包含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::ValidationError { .. } => self.to_string(),
            AppError::NotFoundError { entity, .. } => format!("{} does not exist", entity),
            AppError::Unauthorized => "You are not allowed to perform this action".to_string(),
            AppError::UnsupportedMediaTypeError { .. } => "Only image uploads are accepted".to_string(),
            AppError::PayloadTooLargeError { limit, .. } => {
                format!("Files must be smaller than {} MiB", limit / (1024 * 1024))
            }
            AppError::VersionConflictError { .. } => {
                "The list was changed elsewhere, reload and try again".to_string()
            }
            AppError::RemoteError { status, .. } => format!("Server responded with status {}", status),
            AppError::HttpError(_) => "Could not reach the server".to_string(),
            err if err.category() == ErrorCategory::Configuration => {
                format!("Configuration problem: {}", err)
            }
            _ => "Something went wrong on our side".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML config file and referenced environment variables",
            ErrorCategory::Validation => "Fix the highlighted fields and submit again",
            ErrorCategory::Authorization => "Sign in with an account on the allow-list",
            ErrorCategory::Persistence => "Check that the database file is reachable and not corrupted",
            ErrorCategory::Storage => "Check object storage credentials and bucket settings",
            ErrorCategory::Network => "Check the server address and retry",
            ErrorCategory::Internal => "Retry the request; report it if the problem persists",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
