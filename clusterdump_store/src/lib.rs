//! Access to the document database being backed up or restored into.
//!
//! The backup and restore pipelines only ever talk to a [`DocumentStore`]; [`MongoStore`] is the
//! implementation that talks to a real cluster.

#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

pub mod mongo;

use async_trait::async_trait;
use bson::Document;
use std::fmt::{Debug, Display};
use thiserror::Error;

pub use mongo::MongoStore;

/// Boxed error from the underlying driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Databases that are never backed up.
pub const SYSTEM_DATABASES: [&str; 3] = ["admin", "local", "config"];

/// Returns true for the databases in [`SYSTEM_DATABASES`].
pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES.contains(&name)
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to the cluster: {0}")]
    Connect(#[source] BoxError),

    #[error("failed to list databases: {0}")]
    ListDatabases(#[source] BoxError),

    #[error("failed to list collections in database {database:?}: {source}")]
    ListCollections {
        database: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read documents from {namespace}: {source}")]
    Find {
        namespace: Namespace,
        #[source]
        source: BoxError,
    },

    #[error("failed to drop collection {namespace}: {source}")]
    Drop {
        namespace: Namespace,
        #[source]
        source: BoxError,
    },

    #[error("failed to insert documents into {namespace}: {source}")]
    Insert {
        namespace: Namespace,
        #[source]
        source: BoxError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A `database.collection` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// What a [`DocumentStore::drop_collection`] call found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Dropped,
    /// The collection did not exist; nothing was done.
    NotFound,
}

/// The operations backup and restore need from a cluster.
///
/// One store is one open connection. Callers release it with [`DocumentStore::close`] exactly
/// once, after which no other method is called.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync + 'static {
    /// Every database visible to the connection, system databases included.
    async fn list_database_names(&self) -> Result<Vec<String>>;

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>>;

    /// The whole collection: no filter, no projection, no limit.
    async fn find_all(&self, namespace: &Namespace) -> Result<Vec<Document>>;

    /// Drop a collection. A collection that does not exist is not an error.
    async fn drop_collection(&self, namespace: &Namespace) -> Result<DropOutcome>;

    /// Ordered bulk insert. Stops at the first failing document, e.g. on a duplicate `_id`;
    /// documents before it stay inserted. Returns the number of documents inserted.
    async fn insert_many(&self, namespace: &Namespace, documents: Vec<Document>) -> Result<usize>;

    /// Release the connection.
    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_databases() {
        for name in ["admin", "local", "config"] {
            assert!(is_system_database(name));
        }
        for name in ["Admin", "configs", "app", ""] {
            assert!(!is_system_database(name));
        }
    }

    #[test]
    fn namespace_display() {
        assert_eq!(Namespace::new("shop", "orders").to_string(), "shop.orders");
        assert_eq!(
            Namespace::new("shop", "system.views").to_string(),
            "shop.system.views"
        );
    }
}
