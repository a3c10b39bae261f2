//! Recipe recommendation engine.
//!
//! The engine picks a blueprint from a small static catalog, adjusts it for the
//! caller's goals and returns a self-contained [`Recipe`]. It sits behind the
//! [`RecipeService`] trait so a remote generator can replace the mock later.

pub mod assembly;
pub mod catalog;
mod mock;
pub mod selection;

pub use catalog::{catalog, RecipeTemplate};
pub use mock::{Latency, MockRecipeService};

use async_trait::async_trait;
use std::error::Error;
use std::fmt;

use crate::models::{GenerateRecipeInput, Recipe, RefineRecipeInput};

/// Number of alternatives requested when the caller does not say.
pub const DEFAULT_ALTERNATIVES: usize = 2;

#[derive(Debug)]
pub enum RecipeServiceError {
    InvalidInput(String),
    Unavailable(String),
}

impl fmt::Display for RecipeServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeServiceError::InvalidInput(reason) => write!(f, "Invalid input: {}", reason),
            RecipeServiceError::Unavailable(reason) => {
                write!(f, "Recipe service unavailable: {}", reason)
            }
        }
    }
}

impl Error for RecipeServiceError {}

/// A recipe generator. Every call produces brand-new recipes with fresh ids.
#[async_trait]
pub trait RecipeService: Send + Sync + fmt::Debug {
    async fn generate_recipe(&self, input: &GenerateRecipeInput) -> Result<Recipe, RecipeServiceError>;

    /// Up to `count` recipes that differ from `original`.
    async fn generate_alternatives(
        &self,
        original: &Recipe,
        count: usize,
    ) -> Result<Vec<Recipe>, RecipeServiceError>;

    async fn refine_recipe(&self, input: &RefineRecipeInput) -> Result<Recipe, RecipeServiceError>;

    /// Short identifier used in logs (e.g. "mock").
    fn service_name(&self) -> &'static str;
}
