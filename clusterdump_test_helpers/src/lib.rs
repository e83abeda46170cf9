#![deny(rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self
)]

//! Shared fixtures for clusterdump tests.

pub use tempfile;

pub mod memory;
pub mod tracing;

pub use memory::InMemoryStore;

/// A fresh scratch directory, removed when dropped.
pub fn tmp_dir() -> std::io::Result<tempfile::TempDir> {
    tempfile::Builder::new().prefix("clusterdump").tempdir()
}
