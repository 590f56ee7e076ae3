//! HTTP host for the Caldera CalDAV server.

pub mod app;
pub mod error;
pub mod handler;
