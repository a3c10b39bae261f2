//! The fixed, ordered list of recipe blueprints the engine picks from.
//!
//! Order matters: template selection takes the first template that clears the
//! match threshold, and falls back to the first entry when none does.

use crate::models::{Nutrition, TimingTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTemplate {
    pub title: &'static str,
    /// Lowercase canonical names, used both as the ingredient list and as match keys.
    pub base_ingredients: &'static [&'static str],
    pub steps: &'static [&'static str],
    pub base_nutrition: Nutrition,
    pub timing_tag: TimingTag,
    pub allergy_warnings: &'static [&'static str],
}

impl RecipeTemplate {
    /// Allergens as an owned list, or `None` when the template has none.
    pub fn allergy_warnings_owned(&self) -> Option<Vec<String>> {
        if self.allergy_warnings.is_empty() {
            None
        } else {
            Some(self.allergy_warnings.iter().map(|a| a.to_string()).collect())
        }
    }
}

const fn estimated(calories: i32, protein_g: i32, carbs_g: i32, fat_g: i32) -> Nutrition {
    Nutrition {
        calories,
        protein_g,
        carbs_g,
        fat_g,
        verified: false,
    }
}

static CATALOG: [RecipeTemplate; 4] = [
    RecipeTemplate {
        title: "Grilled Chicken with Roasted Vegetables",
        base_ingredients: &["chicken", "vegetables", "olive oil", "garlic"],
        steps: &[
            "Preheat your oven to 400°F (200°C)",
            "Season the chicken breast with salt, pepper, and herbs",
            "Chop vegetables into even-sized pieces",
            "Toss vegetables with olive oil and minced garlic",
            "Place chicken on a baking sheet with vegetables around it",
            "Roast for 25-30 minutes until chicken reaches 165°F internal temperature",
            "Let rest for 5 minutes before serving",
        ],
        base_nutrition: estimated(350, 42, 18, 12),
        timing_tag: TimingTag::PostWorkout,
        allergy_warnings: &[],
    },
    RecipeTemplate {
        title: "Veggie Pasta Primavera",
        base_ingredients: &["pasta", "vegetables", "olive oil", "garlic", "parmesan"],
        steps: &[
            "Bring a large pot of salted water to boil",
            "Cook pasta according to package directions",
            "While pasta cooks, sauté vegetables in olive oil",
            "Add minced garlic and cook for 1 minute",
            "Drain pasta, reserving 1 cup pasta water",
            "Toss pasta with vegetables, adding pasta water as needed",
            "Top with grated parmesan and fresh herbs",
        ],
        base_nutrition: estimated(420, 14, 65, 14),
        timing_tag: TimingTag::FamilyFriendly,
        allergy_warnings: &["wheat", "dairy"],
    },
    RecipeTemplate {
        title: "Protein-Packed Scrambled Eggs",
        base_ingredients: &["eggs", "milk", "butter", "cheese"],
        steps: &[
            "Crack eggs into a bowl and whisk with a splash of milk",
            "Heat butter in a non-stick pan over medium heat",
            "Pour in egg mixture and let sit for 20 seconds",
            "Gently stir with a spatula, creating large curds",
            "When eggs are nearly set but still creamy, remove from heat",
            "Fold in shredded cheese and let it melt",
            "Season with salt and pepper to taste",
        ],
        base_nutrition: estimated(280, 24, 4, 19),
        timing_tag: TimingTag::PreWorkout,
        allergy_warnings: &["eggs", "dairy"],
    },
    RecipeTemplate {
        title: "Mediterranean Quinoa Bowl",
        base_ingredients: &["quinoa", "chickpeas", "cucumber", "tomatoes", "feta", "olive oil"],
        steps: &[
            "Rinse quinoa under cold water",
            "Cook quinoa in water (1:2 ratio) for 15 minutes",
            "Drain and rinse chickpeas",
            "Chop cucumber, tomatoes, and red onion",
            "Fluff cooked quinoa with a fork",
            "Mix quinoa with vegetables and chickpeas",
            "Top with crumbled feta and drizzle with olive oil and lemon juice",
        ],
        base_nutrition: estimated(380, 16, 52, 14),
        timing_tag: TimingTag::Health,
        allergy_warnings: &["dairy"],
    },
];

/// All templates in catalog order. Never empty.
pub fn catalog() -> &'static [RecipeTemplate] {
    &CATALOG
}

/// The template used when nothing in the pantry matches.
pub fn default_template() -> &'static RecipeTemplate {
    &CATALOG[0]
}

pub fn find_by_title(title: &str) -> Option<&'static RecipeTemplate> {
    let needle = title.trim().to_lowercase();
    CATALOG.iter().find(|t| t.title.to_lowercase() == needle)
}
