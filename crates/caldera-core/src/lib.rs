//! Shared types, configuration and collaborator contracts for the Caldera
//! CalDAV server.

pub mod codec;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod etag;
pub mod store;
pub mod types;
