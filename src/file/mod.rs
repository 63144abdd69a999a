//! Attachment file storage.

pub mod storage;

pub use storage::{FileStorage, LocalFileStorage};

/// Maximum accepted upload size (10 MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
