//! Client-side state containers.
//!
//! Each store owns its state in a `tokio::sync::watch` channel: methods update it and
//! return a result, observers call `subscribe()` to follow changes. Persistence is
//! best-effort unless a method says otherwise: a failed write is logged and the
//! in-memory state is kept.

pub mod pantry;
pub mod recipe;
pub mod user;

pub use pantry::{PantryState, PantryStore};
pub use recipe::{RecipeState, RecipeStore};
pub use user::{UserState, UserStore};

use std::error::Error;
use std::fmt;

use crate::engine::RecipeServiceError;
use crate::storage::StorageError;

#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Service(RecipeServiceError),
    PantryFull { limit: usize },
    InvalidItem(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Storage(_) => write!(f, "Storage failure"),
            StoreError::Service(_) => write!(f, "Recipe service failure"),
            StoreError::PantryFull { limit } => {
                write!(f, "Pantry is full ({} items maximum)", limit)
            }
            StoreError::InvalidItem(reason) => write!(f, "Invalid pantry item: {}", reason),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Storage(err) => Some(err),
            StoreError::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Storage(err)
    }
}

impl From<RecipeServiceError> for StoreError {
    fn from(err: RecipeServiceError) -> Self {
        StoreError::Service(err)
    }
}
