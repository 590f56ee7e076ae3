use caldera_core::error::CoreError;
use thiserror::Error;

use crate::dav::parse::ParseError;

/// Wire format errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("Invalid iCalendar data: {0}")]
    InvalidCalendar(String),

    #[error("XML serialization error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error(transparent)]
    CoreError(#[from] CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

impl From<RfcError> for CoreError {
    fn from(err: RfcError) -> Self {
        match err {
            RfcError::ParseError(e) => Self::MalformedBody(e.to_string()),
            RfcError::InvalidCalendar(msg) => Self::MalformedBody(msg),
            RfcError::XmlError(e) => Self::CodecError(e.to_string()),
            RfcError::CoreError(e) => e,
        }
    }
}
