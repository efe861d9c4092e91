use thiserror::Error;

/// The only way the deadline clock can fail: the stored value is not a point in time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("Invalid deadline: '{input}' is not a valid point in time")]
    InvalidDeadline { input: String },
}

#[derive(Error, Debug)]
pub enum PortalError {
    #[error(transparent)]
    Deadline(#[from] DeadlineError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Data store returned {status}: {message}")]
    StoreError { status: u16, message: String },

    #[error("Record {id} not found in {table}")]
    NotFound { table: String, id: String },

    #[error("Access denied: the access code was not accepted")]
    AccessDenied,

    #[error("Upload of '{file}' failed: {message}")]
    UploadError { file: String, message: String },

    #[error("Notification failed: {message}")]
    NotificationError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Storage,
    Access,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PortalError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        PortalError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PortalError::Deadline(_) | PortalError::ValidationError { .. } => ErrorCategory::Input,
            PortalError::ConfigError { .. }
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PortalError::HttpError(_) | PortalError::NotificationError { .. } => {
                ErrorCategory::Network
            }
            PortalError::StoreError { .. }
            | PortalError::NotFound { .. }
            | PortalError::UploadError { .. } => ErrorCategory::Storage,
            PortalError::AccessDenied => ErrorCategory::Access,
            PortalError::IoError(_)
            | PortalError::SerializationError(_)
            | PortalError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage => match self {
                PortalError::NotFound { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            ErrorCategory::Access | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PortalError::Deadline(_) => {
                "Use an ISO 8601 timestamp such as 2025-03-01T17:00:00+02:00".to_string()
            }
            PortalError::HttpError(_) => {
                "Check the network connection and the [store] url in the config file".to_string()
            }
            PortalError::StoreError { status, .. } if *status == 401 || *status == 403 => {
                "Check the [store] api_key; the data store rejected the credentials".to_string()
            }
            PortalError::StoreError { .. } => {
                "The data store rejected the request; check the table names and payload"
                    .to_string()
            }
            PortalError::NotFound { .. } => {
                "List the records first and use an id that exists".to_string()
            }
            PortalError::AccessDenied => "Re-enter the access PIN".to_string(),
            PortalError::UploadError { .. } => {
                "Check the [storage] bucket and that the file type is allowed".to_string()
            }
            PortalError::NotificationError { .. } => {
                "Check the [contact] endpoint in the config file".to_string()
            }
            PortalError::ConfigError { .. }
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            PortalError::ValidationError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
            PortalError::IoError(_) => "Check file paths and permissions".to_string(),
            PortalError::SerializationError(_) | PortalError::CsvError(_) => {
                "The data could not be encoded; please report this".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PortalError::Deadline(DeadlineError::InvalidDeadline { input }) => {
                format!("'{}' is not a valid deadline", input)
            }
            PortalError::HttpError(_) => "Could not reach the portal data store".to_string(),
            PortalError::StoreError { status, .. } => {
                format!("The portal data store refused the request (HTTP {})", status)
            }
            PortalError::AccessDenied => "Invalid PIN. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
