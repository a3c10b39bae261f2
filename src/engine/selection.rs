use crate::engine::catalog::{catalog, default_template, RecipeTemplate};
use crate::models::{Goal, Nutrition};

/// A template is picked once this many of its base ingredients are covered by the pantry.
pub const MATCH_THRESHOLD: usize = 2;

const FITNESS_PROTEIN_MULTIPLIER: f64 = 1.25;
const HEALTH_FAT_MULTIPLIER: f64 = 0.8;
const BOOST_PROTEIN_MULTIPLIER: f64 = 1.5;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Rounds halves toward positive infinity, so 52.5 -> 53 and -2.5 -> -2.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Lowercases pantry entries, drops blanks and duplicates, keeps first-seen order.
pub fn normalize_pantry_items(items: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let lowered = item.trim().to_lowercase();
        if !lowered.is_empty() && !normalized.contains(&lowered) {
            normalized.push(lowered);
        }
    }
    normalized
}

/// Counts base ingredients that partially match any normalized pantry entry, in either direction.
pub fn count_template_matches(template: &RecipeTemplate, normalized_pantry: &[String]) -> usize {
    template
        .base_ingredients
        .iter()
        .filter(|base| {
            normalized_pantry
                .iter()
                .any(|user| user.contains(**base) || base.contains(user.as_str()))
        })
        .count()
}

/// Greedy first-fit over the catalog: the first template reaching `MATCH_THRESHOLD` wins,
/// regardless of whether a later template would match more. Falls back to the first template.
pub fn select_recipe_template(pantry_items: &[String]) -> &'static RecipeTemplate {
    let normalized = normalize_pantry_items(pantry_items);

    for template in catalog() {
        let matches = count_template_matches(template, &normalized);
        if matches >= MATCH_THRESHOLD {
            tracing::debug!(template = template.title, matches, "Selected recipe template");
            return template;
        }
    }

    let fallback = default_template();
    tracing::debug!(
        template = fallback.title,
        pantry_items = normalized.len(),
        "No template reached the match threshold, using default"
    );
    fallback
}

/// Applies goal adjustments to a template's base nutrition.
///
/// Fitness raises protein by 25% and then adds calories derived from the *new* protein
/// figure; health trims fat by 20% and then removes calories derived from the *new* fat
/// figure. Fitness is applied before health. The result is always unverified.
pub fn adjust_nutrition_for_goals(base: &Nutrition, goals: &[Goal]) -> Nutrition {
    let mut adjusted = *base;

    if goals.contains(&Goal::Fitness) {
        adjusted.protein_g = round_half_up(f64::from(adjusted.protein_g) * FITNESS_PROTEIN_MULTIPLIER);
        adjusted.calories += round_half_up(f64::from(adjusted.protein_g) * 0.25 * KCAL_PER_G_PROTEIN);
    }

    if goals.contains(&Goal::Health) {
        adjusted.fat_g = round_half_up(f64::from(adjusted.fat_g) * HEALTH_FAT_MULTIPLIER);
        adjusted.calories -= round_half_up(f64::from(adjusted.fat_g) * 0.2 * KCAL_PER_G_FAT);
    }

    adjusted.verified = false;
    adjusted
}

/// Protein bump used by the `boost_protein` refinement. Calories are left as they are.
pub fn boost_protein(base: &Nutrition) -> Nutrition {
    Nutrition {
        protein_g: round_half_up(f64::from(base.protein_g) * BOOST_PROTEIN_MULTIPLIER),
        verified: false,
        ..*base
    }
}
