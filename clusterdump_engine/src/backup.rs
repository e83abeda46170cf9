//! Dump every non-system database of a cluster into a new backup instance.

use crate::Result;
use clusterdump_archive::{
    ArchiveRoot, Identity, InstanceDir, InstanceName, JsonFormat, file::write_collection_file,
};
use clusterdump_store::{DocumentStore, Namespace, is_system_database};
use clusterdump_time::TimeProvider;
use std::sync::Arc;
use tracing::info;

/// Counts reported by a completed backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    /// The instance directory the backup was written to.
    pub instance: InstanceDir,
    pub databases: usize,
    pub collections: usize,
    pub documents: usize,
    pub skipped_system_databases: usize,
}

impl BackupSummary {
    fn new(instance: InstanceDir) -> Self {
        Self {
            instance,
            databases: 0,
            collections: 0,
            documents: 0,
            skipped_system_databases: 0,
        }
    }
}

#[derive(Debug)]
pub struct Backup {
    archive_root: ArchiveRoot,
    identity: Identity,
    format: JsonFormat,
    time_provider: Arc<dyn TimeProvider>,
}

impl Backup {
    /// `connection` is only used to name the backup instance; it is not kept.
    pub fn new(
        archive_root: ArchiveRoot,
        connection: &str,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            archive_root,
            identity: Identity::from_connection(connection),
            format: JsonFormat::default(),
            time_provider,
        }
    }

    pub fn with_format(self, format: JsonFormat) -> Self {
        Self { format, ..self }
    }

    /// Run the backup against an already connected store, then close the store whatever the
    /// outcome.
    pub async fn run<S>(&self, store: &S) -> Result<BackupSummary>
    where
        S: DocumentStore + ?Sized,
    {
        let result = self.dump(store).await;
        store.close().await;
        result
    }

    async fn dump<S>(&self, store: &S) -> Result<BackupSummary>
    where
        S: DocumentStore + ?Sized,
    {
        self.archive_root.create().await?;

        let name = InstanceName::new(&self.identity, self.time_provider.now());
        let instance = self.archive_root.instance(&name);
        instance.create().await?;
        info!(path = %instance.display(), "backup folder");

        let databases = store.list_database_names().await?;
        info!(count = databases.len(), "found databases");

        let mut summary = BackupSummary::new(instance.clone());
        for database in databases {
            if is_system_database(&database) {
                info!(%database, "skipping system database");
                summary.skipped_system_databases += 1;
                continue;
            }

            info!(%database, "backing up database");
            let database_dir = instance.database(&database);
            database_dir.create().await?;

            for collection in store.list_collection_names(&database).await? {
                let namespace = Namespace::new(database.as_str(), collection.as_str());
                info!(%namespace, "backing up collection");

                let documents = store.find_all(&namespace).await?;
                let file = database_dir.collection_file(&collection);
                let written = write_collection_file(&file, documents, self.format).await?;
                info!(%namespace, documents = written, path = %file.display(), "saved collection");

                summary.collections += 1;
                summary.documents += written;
            }
            summary.databases += 1;
        }

        info!(
            databases = summary.databases,
            collections = summary.collections,
            documents = summary.documents,
            "cluster backup completed"
        );
        Ok(summary)
    }
}
