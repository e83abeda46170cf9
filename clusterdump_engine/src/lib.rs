//! The backup and restore pipelines.
//!
//! Both pipelines are straight-line traversals over a [`DocumentStore`]: one collection at a
//! time, each operation awaited before the next begins, no retries and no checkpoints. The first
//! error aborts the run. Either way the store connection is closed exactly once before the
//! pipeline returns.
//!
//! [`DocumentStore`]: clusterdump_store::DocumentStore

#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

pub mod backup;
pub mod listing;
pub mod restore;
pub mod select;

use std::path::PathBuf;
use thiserror::Error;

pub use backup::{Backup, BackupSummary};
pub use restore::{ConflictMode, Restore, RestoreSummary, choose_instance};
pub use select::{PresetSelector, SelectError, Selector, TerminalSelector};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Archive(#[from] clusterdump_archive::Error),

    #[error(transparent)]
    Store(#[from] clusterdump_store::Error),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("no backups found in {0:?}")]
    NoBackups(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
