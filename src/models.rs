//! Domain value types shared by the engine, the stores and the CLI.
//!
//! Field names follow the JSON the mobile app persists (`protein_g`, `timingTag`, `qty`, ...)
//! so recipes written by one side can be read back by the other.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Raised when a wire tag does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTagError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} tag: '{}'", self.kind, self.value)
    }
}

impl Error for ParseTagError {}

// Generates the snake_case tag table plus Display/FromStr for a fieldless enum.
macro_rules! wire_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $tag:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseTagError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($tag => Ok($name::$variant),)+
                    _ => Err(ParseTagError { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryFilter {
    Vegan,
    Vegetarian,
    GlutenFree,
    LowCost,
    None,
}

wire_enum!(DietaryFilter, "dietary filter", {
    Vegan => "vegan",
    Vegetarian => "vegetarian",
    GlutenFree => "gluten_free",
    LowCost => "low_cost",
    None => "none",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Fitness,
    Family,
    Health,
}

wire_enum!(Goal, "goal", {
    Fitness => "fitness",
    Family => "family",
    Health => "health",
});

/// When a recipe is best eaten. `Health` is carried by the quinoa bowl template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingTag {
    PreWorkout,
    PostWorkout,
    Recovery,
    KidFriendly,
    FamilyFriendly,
    Health,
}

wire_enum!(TimingTag, "timing", {
    PreWorkout => "pre_workout",
    PostWorkout => "post_workout",
    Recovery => "recovery",
    KidFriendly => "kid_friendly",
    FamilyFriendly => "family_friendly",
    Health => "health",
});

impl TimingTag {
    pub fn label(&self) -> &'static str {
        match self {
            TimingTag::PreWorkout => "Pre-Workout",
            TimingTag::PostWorkout => "Post-Workout",
            TimingTag::Recovery => "Recovery",
            TimingTag::KidFriendly => "Kid-Friendly",
            TimingTag::FamilyFriendly => "Family-Friendly",
            TimingTag::Health => "Health",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PantryMatch {
    UsesPantry,
    NeedsItems,
}

wire_enum!(PantryMatch, "pantry match", {
    UsesPantry => "uses_pantry",
    NeedsItems => "needs_items",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IngredientSource {
    #[default]
    Manual,
    Camera,
    Barcode,
    Voice,
}

wire_enum!(IngredientSource, "ingredient source", {
    Manual => "manual",
    Camera => "camera",
    Barcode => "barcode",
    Voice => "voice",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineAction {
    BoostProtein,
    SwapIngredient,
    Regenerate,
}

wire_enum!(RefineAction, "refine action", {
    BoostProtein => "boost_protein",
    SwapIngredient => "swap_ingredient",
    Regenerate => "regenerate",
});

/// Macro totals for one serving. `verified == false` is rendered as "Estimated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Nutrition {
    pub calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub qty: Option<String>,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), qty: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    /// 1-based position in the recipe.
    pub index: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub nutrition: Nutrition,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timing_tag: Option<TimingTag>,
    pub pantry_match: PantryMatch,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub allergy_warnings: Option<Vec<String>>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<RecipeStep>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pro_tips: Option<Vec<String>>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeInput {
    pub pantry_items: Vec<String>,
    #[serde(default)]
    pub dietary_filters: Vec<DietaryFilter>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl GenerateRecipeInput {
    pub fn new<I, T>(pantry_items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            pantry_items: pantry_items.into_iter().map(Into::into).collect(),
            dietary_filters: Vec::new(),
            goals: Vec::new(),
        }
    }

    pub fn with_goals(mut self, goals: &[Goal]) -> Self {
        self.goals = goals.to_vec();
        self
    }

    pub fn with_filters(mut self, filters: &[DietaryFilter]) -> Self {
        self.dietary_filters = filters.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRecipeInput {
    pub recipe_id: String,
    pub action: RefineAction,
    /// Meant for `swap_ingredient`; carried but not consulted by the mock engine.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_ingredient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    pub id: String,
    pub name: String,
    /// Free text such as "1L", "500g" or "2 cups".
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub source: IngredientSource,
    pub valid: bool,
    pub added_at: i64,
}

/// A pantry item before the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPantryItem {
    pub name: String,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub expires_at: Option<i64>,
    pub source: IngredientSource,
    pub valid: bool,
}

impl NewPantryItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            valid: true,
            ..Default::default()
        }
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PantryItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub expires_at: Option<i64>,
    pub source: Option<IngredientSource>,
    pub valid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dietary_restrictions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub allergens: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preferences: Option<UserPreferences>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub preferences: Option<UserPreferences>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_parse_case_insensitively() {
        assert_eq!("Fitness".parse::<Goal>().unwrap(), Goal::Fitness);
        assert_eq!(" boost_protein ".parse::<RefineAction>().unwrap(), RefineAction::BoostProtein);
        assert_eq!("health".parse::<TimingTag>().unwrap(), TimingTag::Health);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "keto".parse::<DietaryFilter>().unwrap_err();
        assert_eq!(err.kind, "dietary filter");
        assert_eq!(err.value, "keto");
        assert_eq!(err.to_string(), "Unknown dietary filter tag: 'keto'");
    }

    #[test]
    fn test_display_matches_serde_tag() {
        for tag in TimingTag::ALL {
            let json = serde_json::to_string(tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag));
        }
        for action in RefineAction::ALL {
            let json = serde_json::to_string(action).unwrap();
            assert_eq!(json, format!("\"{}\"", action));
        }
    }

    #[test]
    fn test_recipe_json_uses_app_field_names() {
        let recipe = Recipe {
            id: "1_abc".to_string(),
            title: "Toast".to_string(),
            nutrition: Nutrition { calories: 100, protein_g: 3, carbs_g: 20, fat_g: 1, verified: false },
            timing_tag: Some(TimingTag::PreWorkout),
            pantry_match: PantryMatch::UsesPantry,
            allergy_warnings: None,
            ingredients: vec![Ingredient::named("bread")],
            steps: vec![RecipeStep { index: 1, text: "Toast it".to_string(), image_url: None }],
            pro_tips: None,
            created_at: 42,
        };
        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["timingTag"], "pre_workout");
        assert_eq!(value["pantryMatch"], "uses_pantry");
        assert_eq!(value["nutrition"]["protein_g"], 3);
        assert_eq!(value["createdAt"], 42);
        assert!(value.get("allergyWarnings").is_none());
        assert!(value["ingredients"][0].get("qty").is_none());
    }
}
