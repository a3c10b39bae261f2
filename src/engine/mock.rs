//! Catalog-backed stand-in for a remote recipe generator.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

use super::assembly::{assemble_ingredients, build_recipe, template_ingredients};
use super::catalog::catalog;
use super::selection::{adjust_nutrition_for_goals, boost_protein, select_recipe_template};
use super::{RecipeService, RecipeServiceError};
use crate::models::{GenerateRecipeInput, Recipe, RefineAction, RefineRecipeInput};

const BOOSTED_TITLE_PREFIX: &str = "High-Protein ";

/// Artificial delay per operation, simulating a round trip to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub generate: Duration,
    pub alternatives: Duration,
    pub refine: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            generate: Duration::from_millis(1500),
            alternatives: Duration::from_millis(1000),
            refine: Duration::from_millis(800),
        }
    }
}

impl Latency {
    pub fn none() -> Self {
        Self {
            generate: Duration::ZERO,
            alternatives: Duration::ZERO,
            refine: Duration::ZERO,
        }
    }
}

async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Picks templates from the static catalog. All randomness (ids, pro tips, the refine
/// template) comes from one injected generator, so a fixed seed pins every output
/// except timestamps.
#[derive(Debug)]
pub struct MockRecipeService {
    rng: Mutex<StdRng>,
    latency: Latency,
}

impl Default for MockRecipeService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecipeService {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            latency: Latency::default(),
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    // The generator holds no invariants a panicking holder could break, so a poisoned
    // lock is still usable.
    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *guard)
    }
}

#[async_trait]
impl RecipeService for MockRecipeService {
    async fn generate_recipe(&self, input: &GenerateRecipeInput) -> Result<Recipe, RecipeServiceError> {
        simulate(self.latency.generate).await;

        if input.pantry_items.iter().all(|item| item.trim().is_empty()) {
            tracing::warn!("Generating from an empty pantry, falling back to the default template");
        }
        if !input.dietary_filters.is_empty() {
            tracing::debug!(filters = ?input.dietary_filters, "Dietary filters are not applied by the mock engine");
        }

        let template = select_recipe_template(&input.pantry_items);
        let nutrition = adjust_nutrition_for_goals(&template.base_nutrition, &input.goals);
        let ingredients = assemble_ingredients(template, &input.pantry_items);

        let recipe = self.with_rng(|rng| {
            build_recipe(template, template.title.to_string(), nutrition, ingredients, rng)
        });
        tracing::info!(recipe_id = %recipe.id, title = %recipe.title, "Generated recipe");
        Ok(recipe)
    }

    async fn generate_alternatives(
        &self,
        original: &Recipe,
        count: usize,
    ) -> Result<Vec<Recipe>, RecipeServiceError> {
        simulate(self.latency.alternatives).await;

        let templates = catalog();
        let limit = count.min(templates.len().saturating_sub(1));
        let alternatives = self.with_rng(|rng| {
            (0..limit)
                .map(|i| {
                    let template = &templates[(i + 1) % templates.len()];
                    build_recipe(
                        template,
                        template.title.to_string(),
                        template.base_nutrition,
                        template_ingredients(template),
                        rng,
                    )
                })
                .collect::<Vec<_>>()
        });
        tracing::info!(
            original_id = %original.id,
            requested = count,
            returned = alternatives.len(),
            "Generated alternatives"
        );
        Ok(alternatives)
    }

    async fn refine_recipe(&self, input: &RefineRecipeInput) -> Result<Recipe, RecipeServiceError> {
        simulate(self.latency.refine).await;

        if input.action == RefineAction::SwapIngredient && input.target_ingredient.is_none() {
            tracing::debug!(recipe_id = %input.recipe_id, "swap_ingredient requested without a target");
        }

        // The referenced recipe is not consulted: refinement draws a fresh template.
        let templates = catalog();
        let recipe = self.with_rng(|rng| {
            let template = &templates[rng.gen_range(0..templates.len())];
            let (title, nutrition) = match input.action {
                RefineAction::BoostProtein => (
                    format!("{}{}", BOOSTED_TITLE_PREFIX, template.title),
                    boost_protein(&template.base_nutrition),
                ),
                RefineAction::SwapIngredient | RefineAction::Regenerate => {
                    (template.title.to_string(), template.base_nutrition)
                }
            };
            build_recipe(template, title, nutrition, template_ingredients(template), rng)
        });
        tracing::info!(
            previous_id = %input.recipe_id,
            recipe_id = %recipe.id,
            action = %input.action,
            "Refined recipe"
        );
        Ok(recipe)
    }

    fn service_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Goal;

    fn service(seed: u64) -> MockRecipeService {
        MockRecipeService::with_seed(seed).with_latency(Latency::none())
    }

    #[test]
    fn test_default_latency_matches_remote_profile() {
        let latency = MockRecipeService::new().latency();
        assert_eq!(latency.generate, Duration::from_millis(1500));
        assert_eq!(latency.alternatives, Duration::from_millis(1000));
        assert_eq!(latency.refine, Duration::from_millis(800));
    }

    #[tokio::test]
    async fn test_generate_fitness_chicken() {
        let input = GenerateRecipeInput::new(["chicken", "vegetables"]).with_goals(&[Goal::Fitness]);
        let recipe = service(1).generate_recipe(&input).await.unwrap();
        assert_eq!(recipe.title, "Grilled Chicken with Roasted Vegetables");
        assert_eq!(recipe.nutrition.protein_g, 53);
        assert_eq!(recipe.nutrition.calories, 403);
        assert_eq!(recipe.allergy_warnings, None);
    }

    #[tokio::test]
    async fn test_same_seed_same_output_except_timestamp() {
        let input = GenerateRecipeInput::new(["eggs", "milk", "spinach"]);
        let a = service(9).generate_recipe(&input).await.unwrap();
        let b = service(9).generate_recipe(&input).await.unwrap();
        assert_eq!(a.pro_tips, b.pro_tips);
        assert_eq!(a.ingredients, b.ingredients);
        assert_eq!(a.id.split_once('_').unwrap().1, b.id.split_once('_').unwrap().1);
    }

    #[tokio::test]
    async fn test_alternatives_zero_count() {
        let svc = service(2);
        let original = svc.generate_recipe(&GenerateRecipeInput::default()).await.unwrap();
        let alternatives = svc.generate_alternatives(&original, 0).await.unwrap();
        assert!(alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_refine_swap_keeps_template_nutrition() {
        let svc = service(4);
        let input = RefineRecipeInput {
            recipe_id: "abc".to_string(),
            action: RefineAction::SwapIngredient,
            target_ingredient: Some("chicken".to_string()),
        };
        let recipe = svc.refine_recipe(&input).await.unwrap();
        let template = catalog()
            .iter()
            .find(|t| t.title == recipe.title)
            .expect("refined title names a catalog template");
        assert_eq!(recipe.nutrition, template.base_nutrition);
    }
}
