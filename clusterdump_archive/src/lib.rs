//! The on-disk archive format shared by backup and restore.
//!
//! An archive root holds one directory per backup instance. Each instance holds one directory per
//! source database, and each database directory holds one `<collection>.json` file containing the
//! collection's documents as an indented JSON array of Extended JSON objects:
//!
//! ```text
//! <archive root>/
//!   <principal>@<cluster>_<YYYY-MM-DD_HH-MM-SS>/
//!     <database>/
//!       <collection>.json
//! ```

#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

pub mod file;
pub mod naming;
pub mod paths;

use std::path::PathBuf;
use thiserror::Error;

pub use file::JsonFormat;
pub use naming::{Identity, InstanceName};
pub use paths::{ArchiveRoot, CollectionFilePath, DatabaseDir, InstanceDir};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list directory {path:?}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write archive file {path:?}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in archive file {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("archive file {path:?} does not contain a JSON array")]
    NotAnArray { path: PathBuf },

    #[error("element {index} of archive file {path:?} is not a document")]
    NotADocument { path: PathBuf, index: usize },

    #[error("element {index} of archive file {path:?} is not valid Extended JSON: {source}")]
    ExtendedJson {
        path: PathBuf,
        index: usize,
        #[source]
        source: bson::extjson::de::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
