use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{KeyValueStore, StorageError};

/// One JSON document per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `@kitchengenie:pantry_items` -> `<root>/kitchengenie_pantry_items.json`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let name = sanitized.trim_matches('_');
        let name = if name.is_empty() { "_" } else { name };
        self.root.join(format!("{}.json", name))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.path_for(key), value).await?;
        tracing::debug!(key, path = %self.path_for(key).display(), "Persisted value");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_path_for_sanitizes_key() {
        let store = FileStore::new("/data");
        assert_eq!(
            store.path_for("@kitchengenie:pantry_items"),
            PathBuf::from("/data/kitchengenie_pantry_items.json")
        );
    }

    #[tokio::test]
    async fn test_round_trip_creates_directory() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get_item("@kitchengenie:k").await?, None);

        store.set_item("@kitchengenie:k", "[1,2,3]").await?;
        assert_eq!(store.get_item("@kitchengenie:k").await?.as_deref(), Some("[1,2,3]"));

        store.remove_item("@kitchengenie:k").await?;
        store.remove_item("@kitchengenie:k").await?;
        assert_eq!(store.get_item("@kitchengenie:k").await?, None);
        Ok(())
    }
}
