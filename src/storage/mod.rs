//! Key-value persistence boundary used by the stores.
//!
//! Values are JSON strings, keyed the same way the mobile app keys its local storage.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt;

pub const USER_TOKEN_KEY: &str = "@kitchengenie:user_token";
pub const USER_PROFILE_KEY: &str = "@kitchengenie:user_profile";
pub const PANTRY_ITEMS_KEY: &str = "@kitchengenie:pantry_items";
pub const RECENT_RECIPES_KEY: &str = "@kitchengenie:recent_recipes";
pub const SAVED_RECIPES_KEY: &str = "@kitchengenie:saved_recipes";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "Storage I/O error: {}", err),
            StorageError::Serialization(err) => write!(f, "Serialization error: {}", err),
            StorageError::Unavailable(reason) => write!(f, "Storage unavailable: {}", reason),
        }
    }
}

// Leaf error: Display includes the wrapped message.
impl Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err)
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

pub async fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get_item(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized + Sync,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw).await
}
