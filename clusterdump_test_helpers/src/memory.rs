//! An in-process [`DocumentStore`] that behaves like a single MongoDB node for the operations the
//! pipelines use.

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use clusterdump_store::{DocumentStore, DropOutcome, Error, Namespace, Result};
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::atomic::{AtomicUsize, Ordering},
};

#[derive(Debug, thiserror::Error)]
#[error("E11000 duplicate key error collection: {namespace} dup key: {{ _id: {id} }}")]
pub struct DuplicateKeyError {
    pub namespace: Namespace,
    pub id: Bson,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InjectedError(pub String);

type Databases = BTreeMap<String, BTreeMap<String, Vec<Document>>>;

/// Databases exist only while they hold at least one collection, as on a real cluster.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    databases: Mutex<Databases>,
    failing_reads: Mutex<BTreeSet<Namespace>>,
    close_count: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::seed`].
    pub fn with_collection(
        self,
        database: &str,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) -> Self {
        self.seed(&Namespace::new(database, collection), documents);
        self
    }

    /// Create the collection if needed and append `documents` without any duplicate checks.
    pub fn seed(&self, namespace: &Namespace, documents: impl IntoIterator<Item = Document>) {
        self.databases
            .lock()
            .entry(namespace.database.clone())
            .or_default()
            .entry(namespace.collection.clone())
            .or_default()
            .extend(documents);
    }

    /// The contents of a collection, or `None` if it does not exist.
    pub fn documents(&self, namespace: &Namespace) -> Option<Vec<Document>> {
        self.databases
            .lock()
            .get(&namespace.database)
            .and_then(|db| db.get(&namespace.collection))
            .cloned()
    }

    /// Every namespace currently holding a collection, sorted.
    pub fn namespaces(&self) -> Vec<Namespace> {
        self.databases
            .lock()
            .iter()
            .flat_map(|(database, collections)| {
                collections
                    .keys()
                    .map(|collection| Namespace::new(database.as_str(), collection.as_str()))
            })
            .collect()
    }

    /// Make every subsequent [`DocumentStore::find_all`] on `namespace` fail.
    pub fn fail_reads_from(&self, namespace: Namespace) {
        self.failing_reads.lock().insert(namespace);
    }

    /// How many times [`DocumentStore::close`] was called.
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

/// `_id` equality as the server applies it: numbers compare by value whatever their BSON type.
fn same_id(a: &Bson, b: &Bson) -> bool {
    match (numeric_value(a), numeric_value(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn numeric_value(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_database_names(&self) -> Result<Vec<String>> {
        Ok(self.databases.lock().keys().cloned().collect())
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        Ok(self
            .databases
            .lock()
            .get(database)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_all(&self, namespace: &Namespace) -> Result<Vec<Document>> {
        if self.failing_reads.lock().contains(namespace) {
            return Err(Error::Find {
                namespace: namespace.clone(),
                source: Box::new(InjectedError(format!("injected read failure on {namespace}"))),
            });
        }
        Ok(self.documents(namespace).unwrap_or_default())
    }

    async fn drop_collection(&self, namespace: &Namespace) -> Result<DropOutcome> {
        let mut databases = self.databases.lock();
        let Some(collections) = databases.get_mut(&namespace.database) else {
            return Ok(DropOutcome::NotFound);
        };
        let outcome = match collections.remove(&namespace.collection) {
            Some(_) => DropOutcome::Dropped,
            None => DropOutcome::NotFound,
        };
        if collections.is_empty() {
            databases.remove(&namespace.database);
        }
        Ok(outcome)
    }

    async fn insert_many(&self, namespace: &Namespace, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Err(Error::Insert {
                namespace: namespace.clone(),
                source: Box::new(InjectedError("no documents provided".to_string())),
            });
        }

        let mut databases = self.databases.lock();
        let collection = databases
            .entry(namespace.database.clone())
            .or_default()
            .entry(namespace.collection.clone())
            .or_default();

        let mut inserted = 0;
        for mut document in documents {
            if !document.contains_key("_id") {
                let mut with_id = Document::new();
                with_id.insert("_id", ObjectId::new());
                with_id.extend(document);
                document = with_id;
            }
            let id = document.get("_id").cloned().unwrap_or(Bson::Null);
            if collection
                .iter()
                .any(|existing| existing.get("_id").is_some_and(|other| same_id(other, &id)))
            {
                return Err(Error::Insert {
                    namespace: namespace.clone(),
                    source: Box::new(DuplicateKeyError {
                        namespace: namespace.clone(),
                        id,
                    }),
                });
            }
            collection.push(document);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn close(&self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}
