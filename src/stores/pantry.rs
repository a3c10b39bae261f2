use std::sync::Arc;
use tokio::sync::watch;

use super::StoreError;
use crate::models::{IngredientSource, NewPantryItem, PantryItem, PantryItemUpdate};
use crate::storage::{load_json, save_json, KeyValueStore, PANTRY_ITEMS_KEY};
use crate::utils::{generate_id, is_expired, is_expiring_soon, now_millis};

pub const MAX_PANTRY_ITEMS: usize = 100;
pub const EXPIRING_SOON_DAYS: i64 = 3;

/// (name, category) pairs added by `quick_add_staples`.
pub const QUICK_ADD_STAPLES: &[(&str, &str)] = &[
    ("Olive Oil", "Oils & Fats"),
    ("Salt", "Spices & Herbs"),
    ("Black Pepper", "Spices & Herbs"),
    ("Garlic", "Vegetables"),
    ("Onion", "Vegetables"),
    ("Rice", "Grains"),
    ("Pasta", "Grains"),
    ("Flour", "Grains"),
    ("Sugar", "Condiments"),
    ("Eggs", "Dairy"),
    ("Milk", "Dairy"),
    ("Butter", "Dairy"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PantryState {
    pub items: Vec<PantryItem>,
    pub is_loading: bool,
}

#[derive(Debug)]
pub struct PantryStore<S: KeyValueStore + ?Sized> {
    storage: Arc<S>,
    state: watch::Sender<PantryState>,
}

impl<S: KeyValueStore + ?Sized> PantryStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        let (state, _) = watch::channel(PantryState::default());
        Self { storage, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<PantryState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PantryState {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<PantryItem> {
        self.state.borrow().items.clone()
    }

    /// Names of usable items, in pantry order, ready for a generate request.
    pub fn ingredient_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .items
            .iter()
            .filter(|item| item.valid)
            .map(|item| item.name.clone())
            .collect()
    }

    pub fn expiring_soon(&self, threshold_days: i64) -> Vec<PantryItem> {
        let now = now_millis();
        self.state
            .borrow()
            .items
            .iter()
            .filter(|item| is_expiring_soon(item.expires_at, threshold_days, now))
            .cloned()
            .collect()
    }

    pub fn expired(&self) -> Vec<PantryItem> {
        let now = now_millis();
        self.state
            .borrow()
            .items
            .iter()
            .filter(|item| is_expired(item.expires_at, now))
            .cloned()
            .collect()
    }

    /// Replaces the in-memory list with what is persisted. A missing key means an empty
    /// pantry. An unreadable one is logged, leaves the list empty and is returned as an
    /// error; the next write or `clear_all` replaces it.
    pub async fn load_items(&self) -> Result<(), StoreError> {
        self.state.send_modify(|s| s.is_loading = true);
        let loaded = load_json::<Vec<PantryItem>, S>(&*self.storage, PANTRY_ITEMS_KEY).await;
        match loaded {
            Ok(items) => {
                let items = items.unwrap_or_default();
                tracing::debug!(count = items.len(), "Loaded pantry items");
                self.state.send_modify(|s| {
                    s.items = items;
                    s.is_loading = false;
                });
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load pantry items");
                self.state.send_modify(|s| {
                    s.items.clear();
                    s.is_loading = false;
                });
                Err(err.into())
            }
        }
    }

    pub async fn add_item(&self, new_item: NewPantryItem) -> Result<PantryItem, StoreError> {
        let name = new_item.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::InvalidItem("name must not be empty".to_string()));
        }

        let item = PantryItem {
            id: generate_id(&mut rand::thread_rng()),
            name,
            quantity: new_item.quantity,
            category: new_item.category,
            expires_at: new_item.expires_at,
            source: new_item.source,
            valid: new_item.valid,
            added_at: now_millis(),
        };

        let mut full = false;
        self.state.send_if_modified(|s| {
            if s.items.len() >= MAX_PANTRY_ITEMS {
                full = true;
                return false;
            }
            s.items.push(item.clone());
            true
        });
        if full {
            return Err(StoreError::PantryFull { limit: MAX_PANTRY_ITEMS });
        }

        self.persist("add").await;
        Ok(item)
    }

    /// Applies a partial update. Returns the updated item, or `None` for an unknown id.
    pub async fn update_item(&self, id: &str, update: PantryItemUpdate) -> Result<Option<PantryItem>, StoreError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(StoreError::InvalidItem("name must not be empty".to_string()));
            }
        }

        let mut updated = None;
        self.state.send_if_modified(|s| {
            let Some(item) = s.items.iter_mut().find(|item| item.id == id) else {
                return false;
            };
            if let Some(name) = &update.name {
                item.name = name.trim().to_string();
            }
            if let Some(quantity) = &update.quantity {
                item.quantity = Some(quantity.clone());
            }
            if let Some(category) = &update.category {
                item.category = Some(category.clone());
            }
            if let Some(expires_at) = update.expires_at {
                item.expires_at = Some(expires_at);
            }
            if let Some(source) = update.source {
                item.source = source;
            }
            if let Some(valid) = update.valid {
                item.valid = valid;
            }
            updated = Some(item.clone());
            true
        });

        if updated.is_some() {
            self.persist("update").await;
        }
        Ok(updated)
    }

    /// Returns whether an item with `id` was present.
    pub async fn remove_item(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|item| item.id != id);
            s.items.len() != before
        });
        if removed {
            self.persist("remove").await;
        }
        Ok(removed)
    }

    /// Adds the common staples not already present (matched by name, case-insensitively),
    /// up to the pantry limit. Returns the items that were added.
    pub async fn quick_add_staples(&self) -> Result<Vec<PantryItem>, StoreError> {
        let now = now_millis();
        let mut added = Vec::new();

        self.state.send_if_modified(|s| {
            let mut rng = rand::thread_rng();
            let existing: Vec<String> = s.items.iter().map(|item| item.name.to_lowercase()).collect();
            let room = MAX_PANTRY_ITEMS.saturating_sub(s.items.len());
            added = QUICK_ADD_STAPLES
                .iter()
                .filter(|(name, _)| !existing.contains(&name.to_lowercase()))
                .take(room)
                .map(|(name, category)| PantryItem {
                    id: generate_id(&mut rng),
                    name: name.to_string(),
                    quantity: None,
                    category: Some(category.to_string()),
                    expires_at: None,
                    source: IngredientSource::Manual,
                    valid: true,
                    added_at: now,
                })
                .collect();
            s.items.extend(added.iter().cloned());
            !added.is_empty()
        });

        if !added.is_empty() {
            tracing::info!(count = added.len(), "Added pantry staples");
            self.persist("add staples").await;
        }
        Ok(added)
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.state.send_modify(|s| s.items.clear());
        if let Err(err) = self.storage.remove_item(PANTRY_ITEMS_KEY).await {
            tracing::error!(error = %err, "Failed to clear pantry");
        }
        Ok(())
    }

    async fn persist(&self, action: &str) {
        let items = self.items();
        if let Err(err) = save_json(&*self.storage, PANTRY_ITEMS_KEY, &items).await {
            tracing::error!(error = %err, action, "Failed to persist pantry items");
        }
    }
}
