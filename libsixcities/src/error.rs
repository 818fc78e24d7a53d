//! Error types for Six Cities

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SixCitiesError>;

#[derive(Error, Debug)]
pub enum SixCitiesError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SixCitiesError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SixCitiesError::InvalidInput(_) => 3,
            SixCitiesError::Api(e) if e.is_unauthorized() => 2,
            SixCitiesError::Api(_) => 1,
            SixCitiesError::Config(_) => 1,
            SixCitiesError::Storage(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token storage unavailable: {0}")]
    Unavailable(String),
}

/// Classified failure of a single API request
///
/// The `Display` output of each variant is the human-readable message that
/// ends up on a slice's `error` field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request was sent but no response arrived (connect failure, timeout)
    #[error("No response from server. Please check your connection.")]
    Network(String),

    /// Non-2xx response whose body carried a usable message
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Non-2xx response without a message
    #[error("Server error: {0}")]
    Status(u16),

    /// The request could not be built or sent
    #[error("{0}")]
    Client(String),

    /// A 2xx response whose body did not match the expected shape
    #[error("Invalid response from server: {0}")]
    Decode(String),

    #[error("Request was cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Status(status) => Some(*status),
            _ => None,
        }
    }

    /// True for `401 Unauthorized` responses, which evict the stored token
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
