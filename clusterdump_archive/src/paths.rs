use crate::{Error, InstanceName, Result};
use std::{
    ops::Deref,
    path::{Path, PathBuf},
};
use tokio::fs;

/// File extension for collection archive files
pub const COLLECTION_FILE_EXTENSION: &str = "json";

/// Directory holding every backup instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRoot(PathBuf);

impl ArchiveRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Create the root directory and any missing parents. Succeeds if it already exists.
    pub async fn create(&self) -> Result<()> {
        create_dir_all(&self.0).await
    }

    pub fn instance(&self, name: &InstanceName) -> InstanceDir {
        InstanceDir(self.0.join(name.as_str()))
    }

    /// The instance directories under this root, sorted by name.
    ///
    /// A root that does not exist holds no instances.
    pub async fn list_instances(&self) -> Result<Vec<InstanceDir>> {
        let exists = fs::try_exists(&self.0)
            .await
            .map_err(|source| Error::ListDir {
                path: self.0.clone(),
                source,
            })?;
        if !exists {
            return Ok(vec![]);
        }
        Ok(list_dirs(&self.0)
            .await?
            .into_iter()
            .map(InstanceDir)
            .collect())
    }
}

impl Deref for ArchiveRoot {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for ArchiveRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// One backup run: `<root>/<principal>@<cluster>_<timestamp>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDir(PathBuf);

impl InstanceDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The final path component, which is the instance name.
    pub fn name(&self) -> String {
        file_name(&self.0)
    }

    /// Create the instance directory. Re-using an existing directory merges into it.
    pub async fn create(&self) -> Result<()> {
        create_dir_all(&self.0).await
    }

    pub fn database(&self, database: &str) -> DatabaseDir {
        DatabaseDir {
            path: self.0.join(database),
            name: database.to_string(),
        }
    }

    /// The database archives in this instance, sorted by name.
    pub async fn list_databases(&self) -> Result<Vec<DatabaseDir>> {
        Ok(list_dirs(&self.0)
            .await?
            .into_iter()
            .map(|path| DatabaseDir {
                name: file_name(&path),
                path,
            })
            .collect())
    }
}

impl Deref for InstanceDir {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for InstanceDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// The archive of one source database: `<instance>/<database>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseDir {
    path: PathBuf,
    name: String,
}

impl DatabaseDir {
    /// The database name, used verbatim as the directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn create(&self) -> Result<()> {
        create_dir_all(&self.path).await
    }

    pub fn collection_file(&self, collection: &str) -> CollectionFilePath {
        CollectionFilePath {
            path: self
                .path
                .join(format!("{collection}.{COLLECTION_FILE_EXTENSION}")),
            collection: collection.to_string(),
        }
    }

    /// The collection archive files in this directory, sorted by name. Entries without the
    /// archive file extension are ignored.
    pub async fn list_collection_files(&self) -> Result<Vec<CollectionFilePath>> {
        let mut files = vec![];
        for (path, is_dir) in read_dir(&self.path).await? {
            if is_dir {
                continue;
            }
            let name = file_name(&path);
            let Some(collection) = CollectionFilePath::collection_name(&name) else {
                continue;
            };
            files.push(CollectionFilePath {
                collection: collection.to_string(),
                path,
            });
        }
        Ok(files)
    }
}

impl Deref for DatabaseDir {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

impl AsRef<Path> for DatabaseDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// The archive of one collection: `<database dir>/<collection>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFilePath {
    path: PathBuf,
    collection: String,
}

impl CollectionFilePath {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Strip the archive file suffix from a file name. Returns `None` for files that are not
    /// collection archives.
    pub fn collection_name(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(COLLECTION_FILE_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
    }
}

impl Deref for CollectionFilePath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

impl AsRef<Path> for CollectionFilePath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| Error::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

async fn list_dirs(path: &Path) -> Result<Vec<PathBuf>> {
    Ok(read_dir(path)
        .await?
        .into_iter()
        .filter_map(|(path, is_dir)| is_dir.then_some(path))
        .collect())
}

/// Entries of `path` sorted by path, each paired with whether it is a directory. Symlinks are
/// followed.
async fn read_dir(path: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let list_err = |source| Error::ListDir {
        path: path.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(path).await.map_err(list_err)?;
    let mut out = vec![];
    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let entry_path = entry.path();
        let is_dir = fs::metadata(&entry_path)
            .await
            .map_err(list_err)?
            .is_dir();
        out.push((entry_path, is_dir));
    }
    out.sort();
    Ok(out)
}
