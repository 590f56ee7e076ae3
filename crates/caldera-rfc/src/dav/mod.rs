// WebDAV/CalDAV XML: request parsing and multistatus building.

pub mod build;
pub mod core;
pub mod parse;
