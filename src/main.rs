use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use kitchen_genie::cli::{parse_args, Command, GenerateArgs, PantryCommand};
use kitchen_genie::config::Config;
use kitchen_genie::engine::catalog::find_by_title;
use kitchen_genie::engine::{catalog, Latency, MockRecipeService, RecipeTemplate};
use kitchen_genie::models::{GenerateRecipeInput, NewPantryItem, Recipe, RefineRecipeInput};
use kitchen_genie::storage::FileStore;
use kitchen_genie::stores::pantry::EXPIRING_SOON_DAYS;
use kitchen_genie::stores::{PantryStore, RecipeStore};
use kitchen_genie::utils::{
    calculate_total_macros, days_until_expiration, expires_after_days, format_quantity, now_millis, truncate,
};

fn print_recipe(recipe: &Recipe, as_json: bool) -> Result<()> {
    if as_json {
        let json = serde_json::to_string_pretty(recipe).context("Failed to serialize recipe")?;
        println!("{}", json);
        return Ok(());
    }

    let n = &recipe.nutrition;
    println!("{}  [{}]", recipe.title, recipe.id);
    if let Some(tag) = recipe.timing_tag {
        println!("  {}", tag.label());
    }
    println!(
        "  {} kcal | P {}g | C {}g | F {}g ({})",
        n.calories,
        n.protein_g,
        n.carbs_g,
        n.fat_g,
        if n.verified { "Verified" } else { "Estimated" }
    );
    println!(
        "  ~{} kcal from macros",
        calculate_total_macros(n.protein_g, n.carbs_g, n.fat_g)
    );
    if let Some(warnings) = &recipe.allergy_warnings {
        println!("  Contains: {}", warnings.join(", "));
    }
    println!("  Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("    - {} ({})", ingredient.name, format_quantity(ingredient.qty.as_deref()));
    }
    println!("  Steps:");
    for step in &recipe.steps {
        println!("    {}. {}", step.index, step.text);
    }
    if let Some(tips) = &recipe.pro_tips {
        println!("  Pro tips:");
        for tip in tips {
            println!("    * {}", tip);
        }
    }
    Ok(())
}

fn print_recipe_list(recipes: &[Recipe], empty_message: &str) {
    if recipes.is_empty() {
        println!("{}", empty_message);
        return;
    }
    for recipe in recipes {
        println!(
            "{}  {}  {} kcal",
            recipe.id,
            truncate(&recipe.title, 40),
            recipe.nutrition.calories
        );
    }
}

async fn run_generate(
    args: GenerateArgs,
    pantry: &PantryStore<FileStore>,
    recipes: &RecipeStore<FileStore, MockRecipeService>,
    as_json: bool,
) -> Result<()> {
    let mut items = args.pantry_items();
    if args.use_pantry {
        if let Err(err) = pantry.load_items().await {
            tracing::warn!(error = ?err, "Ignoring unreadable pantry");
        }
        items.extend(pantry.ingredient_names());
    }

    let input = GenerateRecipeInput::new(items)
        .with_filters(&args.filters)
        .with_goals(&args.goals);
    let recipe = recipes.generate(&input).await?;
    print_recipe(&recipe, as_json)
}

fn print_template(template: &RecipeTemplate) {
    let n = &template.base_nutrition;
    println!("{}  [{}]", template.title, template.timing_tag.label());
    println!(
        "  {} kcal | P {}g | C {}g | F {}g",
        n.calories, n.protein_g, n.carbs_g, n.fat_g
    );
    println!("  Ingredients: {}", template.base_ingredients.join(", "));
    if !template.allergy_warnings.is_empty() {
        println!("  Contains: {}", template.allergy_warnings.join(", "));
    }
    for (i, step) in template.steps.iter().enumerate() {
        println!("    {}. {}", i + 1, step);
    }
}

async fn run_pantry(command: PantryCommand, pantry: &PantryStore<FileStore>) -> Result<()> {
    // Clearing must work even when the stored list is unreadable.
    if !matches!(command, PantryCommand::Clear) {
        if let Err(err) = pantry.load_items().await {
            tracing::warn!(error = ?err, "Ignoring unreadable pantry");
        }
    }

    match command {
        PantryCommand::List => {
            let now = now_millis();
            let items = pantry.items();
            if items.is_empty() {
                println!("Pantry is empty.");
            }
            for item in items {
                let expiry = match item.expires_at {
                    Some(at) => format!("expires in {} day(s)", days_until_expiration(at, now)),
                    None => "no expiry".to_string(),
                };
                println!(
                    "{}  {}  {}  {}",
                    item.id,
                    item.name,
                    format_quantity(item.quantity.as_deref()),
                    expiry
                );
            }
            let expiring = pantry.expiring_soon(EXPIRING_SOON_DAYS);
            if !expiring.is_empty() {
                println!("{} item(s) expiring soon.", expiring.len());
            }
        }
        PantryCommand::Add {
            name,
            quantity,
            category,
            expires_in_days,
        } => {
            let expires_at = match expires_in_days {
                Some(days) => Some(
                    expires_after_days(now_millis(), days)
                        .ok_or_else(|| anyhow!("Expiry of {} days is out of range", days))?,
                ),
                None => None,
            };
            let item = pantry
                .add_item(NewPantryItem {
                    quantity,
                    category,
                    expires_at,
                    ..NewPantryItem::named(name)
                })
                .await?;
            println!("Added {} [{}]", item.name, item.id);
        }
        PantryCommand::Remove { id } => {
            if !pantry.remove_item(&id).await? {
                return Err(anyhow!("No pantry item with id '{}'", id));
            }
            println!("Removed {}", id);
        }
        PantryCommand::Staples => {
            let added = pantry.quick_add_staples().await?;
            println!("Added {} staple(s).", added.len());
        }
        PantryCommand::Clear => {
            pantry.clear_all().await?;
            println!("Pantry cleared.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let config = cli.apply_to(Config::from_env()?);
    tracing::debug!(data_dir = %config.data_dir.display(), seed = ?config.seed, "Starting");

    let mut service = match config.seed {
        Some(seed) => MockRecipeService::with_seed(seed),
        None => MockRecipeService::new(),
    };
    if !config.simulate_latency {
        service = service.with_latency(Latency::none());
    }

    let storage = Arc::new(FileStore::new(&config.data_dir));
    tracing::debug!(root = %storage.root().display(), "Using file store");
    let pantry = PantryStore::new(storage.clone());
    let recipes = RecipeStore::new(storage, Arc::new(service));
    if let Err(err) = recipes.load_recent_recipes().await {
        tracing::warn!(error = ?err, "Ignoring unreadable recent recipes");
    }
    if let Err(err) = recipes.load_saved_recipes().await {
        tracing::warn!(error = ?err, "Ignoring unreadable saved recipes");
    }

    match cli.command {
        Command::Generate(args) => run_generate(args, &pantry, &recipes, cli.json).await?,
        Command::Alternatives { count } => {
            let latest = recipes
                .state()
                .recent_recipes
                .first()
                .cloned()
                .ok_or_else(|| anyhow!("No recent recipe. Run `generate` first."))?;
            let alternatives = recipes.load_alternatives_with(&latest, count).await?;
            for recipe in &alternatives {
                print_recipe(recipe, cli.json)?;
            }
        }
        Command::Refine {
            action,
            target,
            recipe_id,
        } => {
            let recipe_id = match recipe_id {
                Some(id) => id,
                None => recipes
                    .state()
                    .recent_recipes
                    .first()
                    .map(|r| r.id.clone())
                    .ok_or_else(|| anyhow!("No recent recipe. Run `generate` first."))?,
            };
            let input = RefineRecipeInput {
                recipe_id,
                action,
                target_ingredient: target,
            };
            let recipe = recipes.refine(&input).await?;
            print_recipe(&recipe, cli.json)?;
        }
        Command::Pantry(command) => run_pantry(command, &pantry).await?,
        Command::Recent => print_recipe_list(&recipes.state().recent_recipes, "No recent recipes."),
        Command::Saved => print_recipe_list(&recipes.state().saved_recipes, "No saved recipes."),
        Command::Save { id } => {
            let recipe = recipes
                .find_recipe(&id)
                .ok_or_else(|| anyhow!("No recent recipe with id '{}'", id))?;
            recipes.save_recipe(recipe).await?;
            println!("Saved {}", id);
        }
        Command::Unsave { id } => {
            if recipes.unsave_recipe(&id).await? {
                println!("Removed {} from saved recipes", id);
            } else {
                println!("{} was not saved", id);
            }
        }
        Command::Catalog { title: Some(title) } => {
            let template = find_by_title(&title).ok_or_else(|| anyhow!("No template named '{}'", title))?;
            print_template(template);
        }
        Command::Catalog { title: None } => {
            for template in catalog() {
                println!(
                    "{}  [{}]  {} kcal  ingredients: {}",
                    template.title,
                    template.timing_tag.label(),
                    template.base_nutrition.calories,
                    template.base_ingredients.join(", ")
                );
            }
        }
    }

    Ok(())
}
