//! Reference calendar storage and principal directory.

pub mod directory;
pub mod error;
pub mod filesystem;
pub mod memory;

pub use directory::ConfigDirectory;
pub use error::{StoreError, StoreResult};
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
