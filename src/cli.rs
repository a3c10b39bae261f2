use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::engine::DEFAULT_ALTERNATIVES;
use crate::models::{DietaryFilter, Goal, RefineAction};

pub const MAX_EXPIRY_DAYS: i64 = 36_500;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pantry-driven recipe suggestions", long_about = None)]
pub struct Cli {
    /// Directory holding persisted pantry, recipes and profile
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Seed for reproducible recipes
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Skip the simulated service latency
    #[arg(long, global = true)]
    pub no_latency: bool,

    /// Print recipes as JSON instead of a text summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a recipe from pantry ingredients
    Generate(GenerateArgs),
    /// Suggest alternatives to the most recent recipe
    Alternatives {
        #[arg(short, long, default_value_t = DEFAULT_ALTERNATIVES)]
        count: usize,
    },
    /// Refine a recipe (the most recent one unless --recipe-id is given)
    Refine {
        #[arg(short, long)]
        action: RefineAction,
        /// Ingredient to replace, for swap_ingredient
        #[arg(short, long)]
        target: Option<String>,
        #[arg(long)]
        recipe_id: Option<String>,
    },
    /// Manage pantry items
    #[command(subcommand)]
    Pantry(PantryCommand),
    /// List recently generated recipes
    Recent,
    /// List saved recipes
    Saved,
    /// Save a recent recipe by id
    Save { id: String },
    /// Remove a recipe from the saved list
    Unsave { id: String },
    /// Show the built-in recipe templates, or one template in full
    Catalog {
        /// Template title, case-insensitive
        title: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Comma-separated ingredients, e.g. "chicken, rice"
    #[arg(short, long, value_delimiter = ',')]
    pub pantry: Vec<String>,

    /// Also include the valid items stored in the pantry
    #[arg(long)]
    pub use_pantry: bool,

    #[arg(short, long = "filter", value_delimiter = ',')]
    pub filters: Vec<DietaryFilter>,

    #[arg(short, long = "goal", value_delimiter = ',')]
    pub goals: Vec<Goal>,
}

impl GenerateArgs {
    /// Pantry entries with surrounding whitespace removed and blanks dropped.
    pub fn pantry_items(&self) -> Vec<String> {
        self.pantry
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum PantryCommand {
    List,
    Add {
        name: String,
        #[arg(short, long)]
        quantity: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Days from now until the item expires
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_EXPIRY_DAYS))]
        expires_in_days: Option<i64>,
    },
    Remove { id: String },
    /// Add common staples that are not already present
    Staples,
    Clear,
}

impl Cli {
    /// Flags given on the command line take precedence over environment settings.
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_latency {
            config.simulate_latency = false;
        }
        config
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
