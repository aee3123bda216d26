use thiserror::Error;

use crate::store::StoreError;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The unified error type for a split run
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("[E1001] Invalid training percent {value}: must be between 0 and 100")]
    InvalidPercent { value: i64 },

    #[error("[E1002] Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("[E2001] Attribute '{attribute}' not found in dataset '{dataset}'")]
    AttributeNotFound { dataset: String, attribute: String },

    #[error("[E2002] Dataset not found: {dataset}")]
    DatasetNotFound { dataset: String },

    #[error("[E2003] Malformed dataset: {message}")]
    Malformed { message: String },

    #[error("[E3001] Output dataset already exists: {output}")]
    OutputAlreadyExists { output: String },

    #[error("[E3002] Dataset store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E9004] Internal error: {message}")]
    Internal { message: String },
}

impl SplitError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidPercent { .. } => ErrorCode::INVALID_PERCENT,
            Self::InvalidRequest { .. } => ErrorCode::INVALID_REQUEST,
            Self::AttributeNotFound { .. } => ErrorCode::ATTRIBUTE_NOT_FOUND,
            Self::DatasetNotFound { .. } => ErrorCode::DATASET_NOT_FOUND,
            Self::Malformed { .. } => ErrorCode::MALFORMED_DATASET,
            Self::OutputAlreadyExists { .. } => ErrorCode::OUTPUT_ALREADY_EXISTS,
            Self::StoreUnavailable { .. } => ErrorCode::STORE_UNAVAILABLE,
            Self::Internal { .. } => ErrorCode::INTERNAL,
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPercent { .. } | Self::InvalidRequest { .. } => 2,
            Self::AttributeNotFound { .. }
            | Self::DatasetNotFound { .. }
            | Self::Malformed { .. } => 3,
            Self::OutputAlreadyExists { .. } | Self::StoreUnavailable { .. } => 4,
            Self::Internal { .. } => 1,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPercent { value } => format!(
                "Training percent must be between 0 and 100 (got {})",
                value
            ),
            Self::InvalidRequest { message } => format!("Invalid arguments: {}", message),
            Self::AttributeNotFound { dataset, attribute } => {
                format!("Column '{}' does not exist in '{}'", attribute, dataset)
            }
            Self::DatasetNotFound { dataset } => format!("Input '{}' not found", dataset),
            Self::Malformed { message } => format!("Could not read input: {}", message),
            Self::OutputAlreadyExists { output } => format!(
                "Output '{}' already exists (use --overwrite to replace it)",
                output
            ),
            Self::StoreUnavailable { message, .. } => format!("Storage error: {}", message),
            Self::Internal { message } => format!("Internal error: {}", message),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut msg = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            msg.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        msg
    }
}

/// Type alias for Results using SplitError
pub type Result<T> = std::result::Result<T, SplitError>;

impl From<StoreError> for SplitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AttributeNotFound { dataset, attribute } => {
                Self::AttributeNotFound { dataset, attribute }
            }
            StoreError::DatasetNotFound(dataset) => Self::DatasetNotFound { dataset },
            StoreError::OutputAlreadyExists(output) => Self::OutputAlreadyExists { output },
            StoreError::Unavailable { message, source } => {
                Self::StoreUnavailable { message, source }
            }
            StoreError::Malformed(message) => Self::Malformed { message },
        }
    }
}
