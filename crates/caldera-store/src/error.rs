use caldera_core::error::CoreError;
use thiserror::Error;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),

    #[error("Unknown stock encoding: {0}")]
    UnknownEncoding(String),

    /// The encoding can decode but not encode, so files written in it
    /// would not read back.
    #[error("Unsupported stock encoding: {0}")]
    UnsupportedEncoding(String),

    #[error(transparent)]
    CoreError(#[from] CoreError),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CoreError(e) => e,
            StoreError::UnknownEncoding(label) => {
                Self::ConfigError(format!("unknown stock encoding: {label}"))
            }
            StoreError::UnsupportedEncoding(label) => {
                Self::ConfigError(format!("unsupported stock encoding: {label}"))
            }
            other @ (StoreError::Io { .. } | StoreError::UnknownCalendar(_)) => {
                Self::StorageError(other.to_string())
            }
        }
    }
}
