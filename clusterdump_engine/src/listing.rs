use crate::Result;
use clusterdump_archive::ArchiveRoot;

/// One backup instance found under an archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceListing {
    pub name: String,
    pub databases: usize,
    pub collections: usize,
}

/// Describe every backup instance under `root`, sorted by name. A root that does not exist
/// yields an empty listing.
pub async fn list_instances(root: &ArchiveRoot) -> Result<Vec<InstanceListing>> {
    let mut listings = vec![];
    for instance in root.list_instances().await? {
        let databases = instance.list_databases().await?;
        let mut collections = 0;
        for database in &databases {
            collections += database.list_collection_files().await?.len();
        }
        listings.push(InstanceListing {
            name: instance.name(),
            databases: databases.len(),
            collections,
        });
    }
    Ok(listings)
}
