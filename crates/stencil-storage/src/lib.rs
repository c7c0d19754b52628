//! File store abstraction for the Stencil templating engine.
//!
//! This crate provides a [`Storage`] trait for abstracting page content
//! retrieval and persistence from the underlying backend. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (filesystem today, anything path-addressable later)
//! - **Clean separation** between the template pipeline and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()`, `write()`, and `exists()` methods
//! - [`FsStorage`] implementation rooted at a document-root directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use stencil_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("htdocs"));
//! let html = storage.read("/style/default/index.html")?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
