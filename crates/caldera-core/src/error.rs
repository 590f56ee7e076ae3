use thiserror::Error;

/// Errors shared by the core and its collaborators (codec, store, directory).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The `If-Match` tag of a conditional mutation does not match the
    /// calendar's current entity tag.
    #[error("Precondition failed: expected {expected}, current {current}")]
    PreconditionFailed { expected: String, current: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Codec error: {0}")]
    CodecError(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
