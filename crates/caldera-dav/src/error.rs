use caldera_core::error::CoreError;
use http::StatusCode;
use thiserror::Error;

/// Request handling errors
#[derive(Error, Debug)]
pub enum DavError {
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    #[error("Request body is not valid {charset}")]
    UndecodableBody { charset: String },

    #[error("Invalid {0} header")]
    InvalidHeader(String),

    #[error(transparent)]
    CoreError(#[from] CoreError),
}

impl DavError {
    /// ## Summary
    /// Maps the error onto the status of the HTTP response reporting it.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedCharset(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UndecodableBody { .. }
            | Self::InvalidHeader(_)
            | Self::CoreError(CoreError::MalformedBody(_)) => StatusCode::BAD_REQUEST,
            Self::CoreError(CoreError::PreconditionFailed { .. }) => {
                StatusCode::PRECONDITION_FAILED
            }
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type DavResult<T> = std::result::Result<T, DavError>;
