//! Config for where backups live on disk.

use clusterdump_archive::ArchiveRoot;
use std::path::PathBuf;

/// CLI config for the archive root.
#[derive(Debug, Clone, clap::Parser)]
pub struct ArchiveConfig {
    /// Directory holding one sub-directory per backup.
    #[clap(
        long = "archive-root",
        env = "CLUSTERDUMP_ARCHIVE_ROOT",
        default_value = "exports",
        action
    )]
    pub archive_root: PathBuf,
}

impl ArchiveConfig {
    pub fn root(&self) -> ArchiveRoot {
        ArchiveRoot::new(self.archive_root.clone())
    }
}
