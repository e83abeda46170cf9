//! Replay a backup instance into a cluster.

use crate::{Error, Result, select::Selector};
use clusterdump_archive::{ArchiveRoot, InstanceDir, file::read_collection_file};
use clusterdump_store::{DocumentStore, DropOutcome, Namespace};
use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

/// What to do with a destination collection that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictMode {
    /// Insert on top of the existing contents. Documents whose `_id` is already present make
    /// the insert fail.
    Append,
    /// Drop the collection, then insert.
    Overwrite,
}

impl FromStr for ConflictMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err(format!(
                "'{s}' is not a valid restore mode, values are append and overwrite"
            )),
        }
    }
}

impl Display for ConflictMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Counts reported by a completed restore.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub databases: usize,
    pub collections: usize,
    pub documents: usize,
    /// Collections that existed and were dropped before inserting.
    pub dropped: usize,
    /// Collections whose archive held no documents; nothing was inserted for them.
    pub empty_collections: Vec<Namespace>,
}

/// Resolve the instance to restore among those under `root`, sorted by name.
pub async fn choose_instance(
    root: &ArchiveRoot,
    selector: &mut dyn Selector,
) -> Result<InstanceDir> {
    let mut instances = root.list_instances().await?;
    if instances.is_empty() {
        return Err(Error::NoBackups(root.to_path_buf()));
    }

    let names: Vec<String> = instances.iter().map(InstanceDir::name).collect();
    let index = selector.select_instance(&names)?;
    Ok(instances.swap_remove(index))
}

#[derive(Debug, Clone)]
pub struct Restore {
    instance: InstanceDir,
    mode: ConflictMode,
}

impl Restore {
    pub fn new(instance: InstanceDir, mode: ConflictMode) -> Self {
        Self { instance, mode }
    }

    /// Run the restore against an already connected store, then close the store whatever the
    /// outcome.
    pub async fn run<S>(&self, store: &S) -> Result<RestoreSummary>
    where
        S: DocumentStore + ?Sized,
    {
        let result = self.replay(store).await;
        store.close().await;
        result
    }

    async fn replay<S>(&self, store: &S) -> Result<RestoreSummary>
    where
        S: DocumentStore + ?Sized,
    {
        info!(
            instance = %self.instance.name(),
            mode = %self.mode,
            "restoring backup"
        );

        let mut summary = RestoreSummary::default();
        for database_dir in self.instance.list_databases().await? {
            info!(database = %database_dir.name(), "restoring database");

            for file in database_dir.list_collection_files().await? {
                let namespace = Namespace::new(database_dir.name(), file.collection());
                let documents = read_collection_file(&file).await?;

                if self.mode == ConflictMode::Overwrite
                    && store.drop_collection(&namespace).await? == DropOutcome::Dropped
                {
                    info!(%namespace, "dropped existing collection");
                    summary.dropped += 1;
                }

                summary.collections += 1;
                if documents.is_empty() {
                    warn!(%namespace, "collection archive is empty, nothing to insert");
                    summary.empty_collections.push(namespace);
                    continue;
                }

                let inserted = store.insert_many(&namespace, documents).await?;
                info!(%namespace, documents = inserted, "restored collection");
                summary.documents += inserted;
            }
            summary.databases += 1;
        }

        info!(
            databases = summary.databases,
            collections = summary.collections,
            documents = summary.documents,
            "cluster restore completed"
        );
        Ok(summary)
    }
}
