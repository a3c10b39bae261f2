use anyhow::Result;
use std::collections::HashSet;

use kitchen_genie::engine::catalog::find_by_title;
use kitchen_genie::engine::selection::{round_half_up, select_recipe_template};
use kitchen_genie::engine::{catalog, Latency, MockRecipeService, RecipeService};
use kitchen_genie::models::{DietaryFilter, GenerateRecipeInput, Goal, Recipe, RefineAction, RefineRecipeInput};
use kitchen_genie::storage::{load_json, save_json, FileStore, MemoryStore, RECENT_RECIPES_KEY};

fn service(seed: u64) -> MockRecipeService {
    MockRecipeService::with_seed(seed).with_latency(Latency::none())
}

fn refine_input(recipe_id: &str, action: RefineAction) -> RefineRecipeInput {
    RefineRecipeInput {
        recipe_id: recipe_id.to_string(),
        action,
        target_ingredient: None,
    }
}

#[tokio::test]
async fn test_fitness_goal_on_chicken_template() -> Result<()> {
    let input = GenerateRecipeInput::new(["chicken", "vegetables"])
        .with_filters(&[DietaryFilter::None])
        .with_goals(&[Goal::Fitness]);
    let recipe = service(1).generate_recipe(&input).await?;

    assert_eq!(recipe.title, "Grilled Chicken with Roasted Vegetables");
    assert_eq!(recipe.nutrition.protein_g, 53);
    assert_eq!(recipe.nutrition.calories, 403);
    assert!(!recipe.nutrition.verified);
    Ok(())
}

#[tokio::test]
async fn test_health_goal_on_chicken_template() -> Result<()> {
    let input = GenerateRecipeInput::new(["Chicken breast", "Mixed Vegetables"]).with_goals(&[Goal::Health]);
    let recipe = service(2).generate_recipe(&input).await?;

    assert_eq!(recipe.title, "Grilled Chicken with Roasted Vegetables");
    assert_eq!(recipe.nutrition.fat_g, 10);
    assert_eq!(recipe.nutrition.calories, 332);
    Ok(())
}

#[tokio::test]
async fn test_generated_shape_holds_for_every_template() -> Result<()> {
    let service = service(3);
    for template in catalog() {
        let mut pantry: Vec<String> = template.base_ingredients.iter().map(|s| s.to_string()).collect();
        pantry.extend(["saffron", "truffle", "anchovy", "capers", "mint"].map(String::from));

        // First-fit may pick an earlier template that shares ingredients.
        let selected = select_recipe_template(&pantry);
        let recipe = service.generate_recipe(&GenerateRecipeInput::new(pantry)).await?;
        assert_eq!(recipe.title, selected.title);
        assert_eq!(recipe.steps.len(), selected.steps.len());
        for (i, step) in recipe.steps.iter().enumerate() {
            assert_eq!(step.index as usize, i + 1);
        }
        assert!(recipe.ingredients.len() >= selected.base_ingredients.len());
        assert!(recipe.ingredients.len() <= selected.base_ingredients.len() + 3);
    }
    Ok(())
}

#[tokio::test]
async fn test_identical_input_is_deterministic_on_content_fields() -> Result<()> {
    let service = service(4);
    let input = GenerateRecipeInput::new(["pasta", "garlic", "spinach"]).with_goals(&[Goal::Family]);
    let first = service.generate_recipe(&input).await?;
    let second = service.generate_recipe(&input).await?;

    assert_ne!(first.id, second.id);
    assert_eq!(first.title, second.title);
    assert_eq!(first.nutrition, second.nutrition);
    assert_eq!(first.ingredients, second.ingredients);
    assert_eq!(first.steps, second.steps);
    Ok(())
}

#[tokio::test]
async fn test_refine_always_issues_new_id() -> Result<()> {
    let service = service(5);
    for action in RefineAction::ALL {
        let refined = service.refine_recipe(&refine_input("X", *action)).await?;
        assert_ne!(refined.id, "X");
    }
    Ok(())
}

#[tokio::test]
async fn test_boost_protein_title_prefix() -> Result<()> {
    let service = service(6);
    for _ in 0..8 {
        let refined = service
            .refine_recipe(&refine_input("abc", RefineAction::BoostProtein))
            .await?;
        assert!(refined.title.contains("High-Protein"), "title was {}", refined.title);
    }
    Ok(())
}

#[tokio::test]
async fn test_alternatives_count_and_distinct_ids() -> Result<()> {
    let service = service(7);
    let original = service.generate_recipe(&GenerateRecipeInput::new(["eggs", "cheese"])).await?;

    for count in [0, 1, 2, 3, 10] {
        let alternatives = service.generate_alternatives(&original, count).await?;
        assert_eq!(alternatives.len(), count.min(catalog().len() - 1));
        let ids: HashSet<&str> = alternatives.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), alternatives.len());
        assert!(!ids.contains(original.id.as_str()));
    }
    Ok(())
}

#[tokio::test]
async fn test_alternatives_walk_catalog_from_second_template() -> Result<()> {
    let service = service(17);
    let original = service
        .generate_recipe(&GenerateRecipeInput::new(["chicken", "garlic"]).with_goals(&[Goal::Fitness]))
        .await?;
    let templates = catalog();

    for count in 1..templates.len() {
        let alternatives = service.generate_alternatives(&original, count).await?;
        let titles: Vec<&str> = alternatives.iter().map(|r| r.title.as_str()).collect();
        let expected: Vec<&str> = templates[1..=count].iter().map(|t| t.title).collect();
        assert_eq!(titles, expected);

        for (recipe, template) in alternatives.iter().zip(&templates[1..=count]) {
            assert_eq!(recipe.nutrition, template.base_nutrition);
            assert_eq!(recipe.ingredients.len(), template.base_ingredients.len());
            assert_eq!(recipe.timing_tag, Some(template.timing_tag));
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_boost_protein_scales_named_template() -> Result<()> {
    let service = service(18);
    for _ in 0..12 {
        let refined = service
            .refine_recipe(&refine_input("abc", RefineAction::BoostProtein))
            .await?;
        let base_title = refined
            .title
            .strip_prefix("High-Protein ")
            .expect("boosted title carries the prefix");
        let template = find_by_title(base_title).expect("boosted title names a catalog template");

        let base = template.base_nutrition;
        assert_eq!(refined.nutrition.protein_g, round_half_up(base.protein_g as f64 * 1.5));
        assert_eq!(refined.nutrition.calories, base.calories);
        assert_eq!(refined.nutrition.carbs_g, base.carbs_g);
        assert_eq!(refined.nutrition.fat_g, base.fat_g);
        assert_eq!(refined.steps.len(), template.steps.len());
    }
    Ok(())
}

#[tokio::test]
async fn test_recipe_survives_persistence_round_trip() -> Result<()> {
    let recipe = service(8)
        .generate_recipe(&GenerateRecipeInput::new(["quinoa", "feta", "cucumber"]).with_goals(&[Goal::Health]))
        .await?;

    let memory = MemoryStore::new();
    save_json(&memory, RECENT_RECIPES_KEY, &vec![recipe.clone()]).await?;
    let from_memory: Option<Vec<Recipe>> = load_json(&memory, RECENT_RECIPES_KEY).await?;
    assert_eq!(from_memory, Some(vec![recipe.clone()]));

    let dir = tempfile::tempdir()?;
    let files = FileStore::new(dir.path());
    save_json(&files, RECENT_RECIPES_KEY, &recipe).await?;
    let from_disk: Option<Recipe> = load_json(&files, RECENT_RECIPES_KEY).await?;
    assert_eq!(from_disk, Some(recipe));
    Ok(())
}

#[tokio::test]
async fn test_recipe_json_uses_app_field_names() -> Result<()> {
    let recipe = service(9).generate_recipe(&GenerateRecipeInput::new(["eggs", "milk"])).await?;
    let value = serde_json::to_value(&recipe)?;

    assert_eq!(value["timingTag"], "pre_workout");
    assert_eq!(value["pantryMatch"], "uses_pantry");
    assert!(value["nutrition"]["protein_g"].is_number());
    assert!(value["createdAt"].is_number());
    assert_eq!(value["steps"][0]["index"], 1);
    Ok(())
}
