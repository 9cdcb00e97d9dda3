use thiserror::Error;

/// Errors that can occur when accessing the property store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store has no active reference; `initialize` was never called or
    /// every reference has already been released
    #[error("property store is not initialized")]
    NotInitialized,

    /// The supplied JSON document could not be parsed or is not an object
    #[error("failed to load properties from JSON: {0}")]
    Parse(String),

    /// A property exists but has a different JSON type than requested
    #[error("property '{key}' is not a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
    },
}

/// Result type for property store operations
pub type Result<T> = std::result::Result<T, StoreError>;
