use crate::recipe_commands::RecipeCommands;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Sign in and save the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Sign out and delete the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Recipe operations
    Recipe {
        #[command(subcommand)]
        action: RecipeCommands,
    },
}
