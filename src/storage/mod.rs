//! File storage behind the `/files` endpoint
//!
//! All reads and writes are confined to a single base directory.

pub mod file_store;

pub use file_store::{FileStore, StorageError};
