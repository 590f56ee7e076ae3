// Streaming parsers for DAV request bodies.

pub mod error;
mod namespace;
pub mod propfind;
pub mod report;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use propfind::parse_propfind;
pub use report::parse_report;
