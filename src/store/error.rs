//! Error types for the dataset store layer

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a dataset store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The grouping or key attribute does not exist on the dataset
    #[error("Attribute '{attribute}' not found in dataset '{dataset}'")]
    AttributeNotFound { dataset: String, attribute: String },

    /// The input dataset does not exist
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// An output dataset with the requested name already exists
    #[error("Output already exists: {0}")]
    OutputAlreadyExists(String),

    /// The store could not be read or written
    #[error("Store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The dataset content could not be parsed
    #[error("Malformed dataset: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Create an attribute-not-found error
    pub fn attribute_not_found(dataset: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            dataset: dataset.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an unavailable error without an underlying cause
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unavailable error wrapping the underlying cause
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a malformed-data error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            StoreError::unavailable_with_source("CSV I/O failed", err)
        } else {
            StoreError::malformed(err.to_string())
        }
    }
}
