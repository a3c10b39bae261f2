use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::catalog::RecipeTemplate;
use crate::models::{Ingredient, Nutrition, PantryMatch, Recipe, RecipeStep};
use crate::utils::{generate_id, now_millis};

/// Pantry items that are not part of the template are appended, up to this many.
pub const MAX_EXTRA_INGREDIENTS: usize = 3;

pub const PRO_TIPS: &[&str] = &[
    "Meal prep this recipe on Sunday for quick weekday meals",
    "Use a meat thermometer to ensure perfect doneness every time",
    "Let proteins rest before cutting to retain juices",
    "Season in layers throughout cooking for better flavor",
    "Taste and adjust seasoning at the end",
];

const MIN_PRO_TIPS: usize = 2;

/// Template ingredients in template order, then pantry extras in input order.
///
/// An item counts as already covered when its lowercase form contains a base
/// ingredient. Unlike template selection, the reverse direction is not checked.
pub fn assemble_ingredients(template: &RecipeTemplate, pantry_items: &[String]) -> Vec<Ingredient> {
    let extras = pantry_items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .filter(|item| {
            let lowered = item.to_lowercase();
            !template.base_ingredients.iter().any(|base| lowered.contains(base))
        })
        .take(MAX_EXTRA_INGREDIENTS)
        .map(Ingredient::named);

    template
        .base_ingredients
        .iter()
        .map(|name| Ingredient::named(*name))
        .chain(extras)
        .collect()
}

pub fn template_ingredients(template: &RecipeTemplate) -> Vec<Ingredient> {
    assemble_ingredients(template, &[])
}

/// Numbers the instructions from 1.
pub fn generate_steps(steps: &[&str]) -> Vec<RecipeStep> {
    steps
        .iter()
        .enumerate()
        .map(|(i, text)| RecipeStep {
            index: i as u32 + 1,
            text: text.to_string(),
            image_url: None,
        })
        .collect()
}

/// Shuffles the whole tip pool and keeps two or three of them.
pub fn generate_pro_tips<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let mut pool: Vec<&str> = PRO_TIPS.to_vec();
    pool.shuffle(rng);
    let keep = MIN_PRO_TIPS + rng.gen_range(0..2);
    pool.into_iter().take(keep).map(str::to_string).collect()
}

/// Materializes a template into a self-contained recipe with a fresh id and timestamp.
pub fn build_recipe<R: Rng + ?Sized>(
    template: &RecipeTemplate,
    title: String,
    nutrition: Nutrition,
    ingredients: Vec<Ingredient>,
    rng: &mut R,
) -> Recipe {
    Recipe {
        id: generate_id(rng),
        title,
        nutrition: Nutrition { verified: false, ..nutrition },
        timing_tag: Some(template.timing_tag),
        pantry_match: PantryMatch::UsesPantry,
        allergy_warnings: template.allergy_warnings_owned(),
        ingredients,
        steps: generate_steps(template.steps),
        pro_tips: Some(generate_pro_tips(rng)),
        created_at: now_millis(),
    }
}
