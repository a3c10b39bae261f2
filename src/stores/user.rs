use std::sync::Arc;
use tokio::sync::watch;

use super::StoreError;
use crate::models::{UserProfile, UserProfileUpdate};
use crate::storage::{load_json, save_json, KeyValueStore, USER_PROFILE_KEY, USER_TOKEN_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    pub profile: Option<UserProfile>,
    pub is_loading: bool,
}

#[derive(Debug)]
pub struct UserStore<S: KeyValueStore + ?Sized> {
    storage: Arc<S>,
    state: watch::Sender<UserState>,
}

impl<S: KeyValueStore + ?Sized> UserStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        let (state, _) = watch::channel(UserState::default());
        Self { storage, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> UserState {
        self.state.borrow().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.borrow().profile.clone()
    }

    pub async fn load_profile(&self) -> Result<Option<UserProfile>, StoreError> {
        self.state.send_modify(|s| s.is_loading = true);
        let loaded = load_json::<UserProfile, S>(&*self.storage, USER_PROFILE_KEY).await;

        match loaded {
            Ok(profile) => {
                self.state.send_modify(|s| {
                    s.profile = profile.clone();
                    s.is_loading = false;
                });
                Ok(profile)
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load user profile");
                self.state.send_modify(|s| s.is_loading = false);
                Err(err.into())
            }
        }
    }

    /// Merges `update` into the current profile. Without a profile this is a no-op
    /// returning `None`.
    pub async fn update_profile(&self, update: UserProfileUpdate) -> Result<Option<UserProfile>, StoreError> {
        let mut updated = None;
        self.state.send_if_modified(|s| match s.profile.as_mut() {
            Some(profile) => {
                if let Some(name) = update.name {
                    profile.name = name;
                }
                if let Some(email) = update.email {
                    profile.email = email;
                }
                if let Some(photo_url) = update.photo_url {
                    profile.photo_url = Some(photo_url);
                }
                if let Some(preferences) = update.preferences {
                    profile.preferences = Some(preferences);
                }
                updated = Some(profile.clone());
                true
            }
            None => false,
        });

        match updated {
            Some(profile) => {
                if let Err(err) = save_json(&*self.storage, USER_PROFILE_KEY, &profile).await {
                    tracing::error!(error = %err, "Failed to persist user profile");
                }
                Ok(Some(profile))
            }
            None => {
                tracing::debug!("No profile loaded, ignoring update");
                Ok(None)
            }
        }
    }

    /// Replaces the profile; `None` behaves like `clear_profile`.
    pub async fn set_profile(&self, profile: Option<UserProfile>) -> Result<(), StoreError> {
        match profile {
            Some(profile) => {
                self.state.send_modify(|s| s.profile = Some(profile.clone()));
                save_json(&*self.storage, USER_PROFILE_KEY, &profile).await?;
                Ok(())
            }
            None => self.clear_profile().await,
        }
    }

    /// Forgets the profile and the auth token. Memory is cleared even if storage fails.
    pub async fn clear_profile(&self) -> Result<(), StoreError> {
        self.state.send_modify(|s| s.profile = None);
        self.storage.remove_item(USER_PROFILE_KEY).await?;
        self.storage.remove_item(USER_TOKEN_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserPreferences;
    use crate::storage::MemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            photo_url: None,
            preferences: None,
        }
    }

    #[tokio::test]
    async fn test_load_missing_profile() {
        let store = UserStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load_profile().await.unwrap(), None);
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn test_update_without_profile_is_noop() {
        let storage = Arc::new(MemoryStore::new());
        let store = UserStore::new(storage.clone());
        let update = UserProfileUpdate {
            name: Some("Alex".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update_profile(update).await.unwrap(), None);
        assert!(store.profile().is_none());
        assert!(!storage.contains_key(USER_PROFILE_KEY));
    }

    #[tokio::test]
    async fn test_set_update_and_reload() {
        let storage = Arc::new(MemoryStore::new());
        let store = UserStore::new(storage.clone());
        store.set_profile(Some(profile())).await.unwrap();

        let update = UserProfileUpdate {
            preferences: Some(UserPreferences {
                allergens: Some(vec!["peanuts".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let updated = store.update_profile(update).await.unwrap().unwrap();
        assert_eq!(updated.name, "Sam");

        let reloaded = UserStore::new(storage);
        let loaded = reloaded.load_profile().await.unwrap();
        assert_eq!(loaded, Some(updated));
    }

    #[tokio::test]
    async fn test_clear_profile_removes_token() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_item(USER_TOKEN_KEY, "\"abc\"").await.unwrap();
        let store = UserStore::new(storage.clone());
        store.set_profile(Some(profile())).await.unwrap();

        store.set_profile(None).await.unwrap();
        assert!(store.profile().is_none());
        assert!(!storage.contains_key(USER_PROFILE_KEY));
        assert!(!storage.contains_key(USER_TOKEN_KEY));
    }
}
