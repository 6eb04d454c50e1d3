use crate::RecipeFilter;

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// List recipes
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List recipes owned by the signed-in user
    Mine {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Get a recipe
    Get {
        /// Recipe ID
        id: u64,
    },

    /// Create a recipe
    Create {
        /// Recipe as JSON: title, description, ingredients, steps, ...
        #[arg(long)]
        data: String,
    },

    /// Update a recipe you own
    Update {
        /// Recipe ID
        id: u64,

        /// Fields to change, as JSON
        #[arg(long)]
        data: String,
    },

    /// Delete a recipe you own
    Delete {
        /// Recipe ID
        id: u64,
    },
}

#[derive(Args)]
pub struct FilterArgs {
    /// Text to find in title or description
    #[arg(long)]
    pub search: Option<String>,

    /// Category (entrée, plat, dessert, boisson)
    #[arg(long)]
    pub category: Option<String>,

    /// Difficulty (facile, moyen, difficile)
    #[arg(long)]
    pub difficulty: Option<String>,

    /// Maximum preparation plus cooking time, in minutes
    #[arg(long)]
    pub max_time: Option<u32>,
}

impl From<FilterArgs> for RecipeFilter {
    fn from(args: FilterArgs) -> Self {
        RecipeFilter {
            search: args.search,
            category: args.category,
            difficulty: args.difficulty,
            owner_id: None,
            max_time: args.max_time,
        }
    }
}
