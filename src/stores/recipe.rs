use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use super::StoreError;
use crate::engine::RecipeService;
use crate::models::{GenerateRecipeInput, Recipe, RefineRecipeInput};
use crate::storage::{load_json, save_json, KeyValueStore, RECENT_RECIPES_KEY, SAVED_RECIPES_KEY};

pub const RECENT_RECIPES_CAP: usize = 10;
pub const MAX_RECIPE_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeState {
    pub current_recipe: Option<Recipe>,
    pub alternatives: Vec<Recipe>,
    /// Newest first, at most `RECENT_RECIPES_CAP` entries, unique ids.
    pub recent_recipes: Vec<Recipe>,
    /// In save order, unique ids.
    pub saved_recipes: Vec<Recipe>,
    pub is_generating: bool,
    pub error: Option<String>,
}

/// Places `recipe` at the front of `recent`, dropping any older copy and trimming to the cap.
pub fn push_recent(recent: &mut Vec<Recipe>, recipe: Recipe) {
    recent.retain(|r| r.id != recipe.id);
    recent.insert(0, recipe);
    recent.truncate(RECENT_RECIPES_CAP);
}

/// Holds the current, recent and saved recipes and routes generation through a
/// [`RecipeService`].
///
/// Overlapping generate/refine calls are not serialized: each one that succeeds becomes
/// the current recipe when it completes, so the last to finish wins. `is_generating`
/// stays set until every in-flight call has finished.
#[derive(Debug)]
pub struct RecipeStore<S: KeyValueStore + ?Sized, R: RecipeService + ?Sized> {
    storage: Arc<S>,
    service: Arc<R>,
    state: watch::Sender<RecipeState>,
    in_flight: AtomicUsize,
}

impl<S, R> RecipeStore<S, R>
where
    S: KeyValueStore + ?Sized,
    R: RecipeService + ?Sized,
{
    pub fn new(storage: Arc<S>, service: Arc<R>) -> Self {
        let (state, _) = watch::channel(RecipeState::default());
        Self {
            storage,
            service,
            state,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecipeState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RecipeState {
        self.state.borrow().clone()
    }

    pub fn current_recipe(&self) -> Option<Recipe> {
        self.state.borrow().current_recipe.clone()
    }

    pub fn is_saved(&self, recipe_id: &str) -> bool {
        self.state.borrow().saved_recipes.iter().any(|r| r.id == recipe_id)
    }

    /// Looks a recipe up by id among current, recent and saved recipes.
    pub fn find_recipe(&self, recipe_id: &str) -> Option<Recipe> {
        let state = self.state.borrow();
        state
            .current_recipe
            .iter()
            .chain(state.recent_recipes.iter())
            .chain(state.saved_recipes.iter())
            .find(|r| r.id == recipe_id)
            .cloned()
    }

    pub async fn generate(&self, input: &GenerateRecipeInput) -> Result<Recipe, StoreError> {
        self.begin();
        let result = self.service.generate_recipe(input).await;
        self.finish(result, "Failed to generate recipe").await
    }

    pub async fn refine(&self, input: &RefineRecipeInput) -> Result<Recipe, StoreError> {
        self.begin();
        let result = self.service.refine_recipe(input).await;
        self.finish(result, "Failed to refine recipe").await
    }

    pub async fn load_alternatives(&self, recipe: &Recipe) -> Result<Vec<Recipe>, StoreError> {
        self.load_alternatives_with(recipe, MAX_RECIPE_ALTERNATIVES).await
    }

    /// Fetches up to `count` alternatives for `recipe` and stores them. Failures are logged
    /// and returned without touching the error field.
    pub async fn load_alternatives_with(&self, recipe: &Recipe, count: usize) -> Result<Vec<Recipe>, StoreError> {
        match self.service.generate_alternatives(recipe, count).await {
            Ok(alternatives) => {
                self.state.send_modify(|s| s.alternatives = alternatives.clone());
                Ok(alternatives)
            }
            Err(err) => {
                tracing::error!(error = %err, recipe_id = %recipe.id, "Failed to load alternatives");
                Err(err.into())
            }
        }
    }

    /// Replaces the current recipe and drops alternatives computed for the previous one.
    pub fn set_current_recipe(&self, recipe: Option<Recipe>) {
        self.state.send_modify(|s| {
            s.current_recipe = recipe;
            s.alternatives.clear();
        });
    }

    /// An unreadable list is logged and returned as an error, leaving the list empty.
    pub async fn load_recent_recipes(&self) -> Result<(), StoreError> {
        let loaded = self.load_list(RECENT_RECIPES_KEY).await;
        self.state
            .send_modify(|s| s.recent_recipes = loaded.as_ref().cloned().unwrap_or_default());
        loaded.map(|_| ())
    }

    pub async fn load_saved_recipes(&self) -> Result<(), StoreError> {
        let loaded = self.load_list(SAVED_RECIPES_KEY).await;
        self.state
            .send_modify(|s| s.saved_recipes = loaded.as_ref().cloned().unwrap_or_default());
        loaded.map(|_| ())
    }

    /// Appends `recipe` to the saved list, replacing an earlier copy with the same id.
    /// The in-memory list is updated even if the write fails.
    pub async fn save_recipe(&self, recipe: Recipe) -> Result<(), StoreError> {
        let mut saved = Vec::new();
        self.state.send_modify(|s| {
            s.saved_recipes.retain(|r| r.id != recipe.id);
            s.saved_recipes.push(recipe);
            saved = s.saved_recipes.clone();
        });
        save_json(&*self.storage, SAVED_RECIPES_KEY, &saved).await?;
        Ok(())
    }

    /// Returns whether the recipe was saved before the call.
    pub async fn unsave_recipe(&self, recipe_id: &str) -> Result<bool, StoreError> {
        let mut saved = Vec::new();
        let removed = self.state.send_if_modified(|s| {
            let before = s.saved_recipes.len();
            s.saved_recipes.retain(|r| r.id != recipe_id);
            saved = s.saved_recipes.clone();
            s.saved_recipes.len() != before
        });
        save_json(&*self.storage, SAVED_RECIPES_KEY, &saved).await?;
        Ok(removed)
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    fn begin(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.is_generating = true;
            s.error = None;
        });
    }

    async fn finish(
        &self,
        result: Result<Recipe, crate::engine::RecipeServiceError>,
        failure: &str,
    ) -> Result<Recipe, StoreError> {
        let still_running = self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1;

        match result {
            Ok(recipe) => {
                let mut recent = Vec::new();
                self.state.send_modify(|s| {
                    s.current_recipe = Some(recipe.clone());
                    s.is_generating = still_running;
                    push_recent(&mut s.recent_recipes, recipe.clone());
                    recent = s.recent_recipes.clone();
                });
                if let Err(err) = save_json(&*self.storage, RECENT_RECIPES_KEY, &recent).await {
                    tracing::error!(error = %err, "Failed to persist recent recipes");
                }
                Ok(recipe)
            }
            Err(err) => {
                tracing::error!(error = %err, service = self.service.service_name(), "{}", failure);
                self.state.send_modify(|s| {
                    s.is_generating = still_running;
                    s.error = Some(format!("{}: {}", failure, err));
                });
                Err(err.into())
            }
        }
    }

    async fn load_list(&self, key: &str) -> Result<Vec<Recipe>, StoreError> {
        match load_json::<Vec<Recipe>, S>(&*self.storage, key).await {
            Ok(list) => Ok(list.unwrap_or_default()),
            Err(err) => {
                tracing::error!(error = %err, key, "Failed to load recipes");
                Err(err.into())
            }
        }
    }
}
