//! [`DocumentStore`] backed by the official MongoDB driver.

use crate::{DocumentStore, DropOutcome, Error, Namespace, Result};
use async_trait::async_trait;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    error::{Error as DriverError, ErrorKind},
};
use tracing::debug;

/// Server error code for "ns not found".
const NAMESPACE_NOT_FOUND: i32 = 26;

#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Parse the connection string and ping the cluster, so an unreachable cluster fails here
    /// rather than on the first real operation.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| Error::Connect(e.into()))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| Error::Connect(e.into()))?;
        debug!("connected to cluster");
        Ok(Self { client })
    }

    fn collection(&self, namespace: &Namespace) -> Collection<Document> {
        self.client
            .database(&namespace.database)
            .collection(&namespace.collection)
    }
}

fn is_namespace_not_found(err: &DriverError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(command_error) if command_error.code == NAMESPACE_NOT_FOUND
    )
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_database_names(&self) -> Result<Vec<String>> {
        self.client
            .list_database_names()
            .await
            .map_err(|e| Error::ListDatabases(e.into()))
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        self.client
            .database(database)
            .list_collection_names()
            .await
            .map_err(|e| Error::ListCollections {
                database: database.to_string(),
                source: e.into(),
            })
    }

    async fn find_all(&self, namespace: &Namespace) -> Result<Vec<Document>> {
        let find_err = |e: DriverError| Error::Find {
            namespace: namespace.clone(),
            source: e.into(),
        };
        let cursor = self
            .collection(namespace)
            .find(doc! {})
            .await
            .map_err(find_err)?;
        cursor.try_collect().await.map_err(find_err)
    }

    async fn drop_collection(&self, namespace: &Namespace) -> Result<DropOutcome> {
        match self.collection(namespace).drop().await {
            Ok(()) => Ok(DropOutcome::Dropped),
            // servers before 7.0 reject dropping a collection that does not exist
            Err(e) if is_namespace_not_found(&e) => Ok(DropOutcome::NotFound),
            Err(e) => Err(Error::Drop {
                namespace: namespace.clone(),
                source: e.into(),
            }),
        }
    }

    async fn insert_many(&self, namespace: &Namespace, documents: Vec<Document>) -> Result<usize> {
        let result = self
            .collection(namespace)
            .insert_many(documents)
            .await
            .map_err(|e| Error::Insert {
                namespace: namespace.clone(),
                source: e.into(),
            })?;
        Ok(result.inserted_ids.len())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        debug!("connection closed");
    }
}
