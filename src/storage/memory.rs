use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// In-process store. Writes can be made to fail to exercise best-effort persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("writes disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load_json, save_json};

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").await.unwrap(), None);
        store.set_item("k", "v").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v"));
        store.remove_item("k").await.unwrap();
        store.remove_item("k").await.unwrap();
        assert!(!store.contains_key("k"));
    }

    #[tokio::test]
    async fn test_failing_writes_keep_previous_value() {
        let store = MemoryStore::new();
        save_json(&store, "n", &vec![1, 2]).await.unwrap();
        store.set_fail_writes(true);
        let err = save_json(&store, "n", &vec![3]).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        let kept: Option<Vec<i32>> = load_json(&store, "n").await.unwrap();
        assert_eq!(kept, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_load_json_rejects_garbage() {
        let store = MemoryStore::new();
        store.set_item("bad", "{not json").await.unwrap();
        let result: Result<Option<Vec<String>>, _> = load_json(&store, "bad").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
