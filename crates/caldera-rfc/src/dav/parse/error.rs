//! DAV XML parse error types.

use std::fmt;

/// Result type for DAV XML parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred during DAV XML parsing.
#[derive(Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::XmlError, message)
    }

    #[must_use]
    pub fn missing_element(name: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingElement,
            format!("missing required element: {name}"),
        )
    }

    #[must_use]
    pub fn unexpected_element(name: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedElement,
            format!("unexpected element: {name}"),
        )
    }

    #[must_use]
    pub fn unknown_prefix(prefix: &str) -> Self {
        Self::new(
            ParseErrorKind::UnknownPrefix,
            format!("undeclared namespace prefix: {prefix}"),
        )
    }

    #[must_use]
    pub fn unsupported_report(name: &str) -> Self {
        Self::new(
            ParseErrorKind::UnsupportedReport,
            format!("unsupported report: {name}"),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::new(ParseErrorKind::EncodingError, err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for ParseError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::new(ParseErrorKind::EncodingError, err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    XmlError,
    EncodingError,
    MissingElement,
    UnexpectedElement,
    UnknownPrefix,
    UnsupportedReport,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::XmlError => "XML error",
            Self::EncodingError => "encoding error",
            Self::MissingElement => "missing element",
            Self::UnexpectedElement => "unexpected element",
            Self::UnknownPrefix => "unknown prefix",
            Self::UnsupportedReport => "unsupported report",
        };
        f.write_str(kind)
    }
}
