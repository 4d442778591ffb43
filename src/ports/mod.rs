//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system (cloud file storage, the course table, the local disk).
//! Implementations live in `src/adapters/`.

pub mod filesystem;
pub mod storage;
pub mod table;

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

pub use filesystem::FileSystem;
pub use storage::{FileMetadata, FilePage, FileRecord, FileStorage, FOLDER_MIME_TYPE, PDF_MIME_TYPE};
pub use table::CourseTable;

/// Error type returned by every port method.
pub type PortError = Box<dyn Error + Send + Sync>;

/// Boxed future returned by async port methods to keep the traits dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;
