//! recette - Recette recipe-sharing client
//!
//! Signs in against the Recette REST API, keeps the session on disk between
//! runs, and browses recipes with it.
//!
//! # Examples
//!
//! ```bash
//! # Sign in (the session is saved in the config directory)
//! recette login --email chef@example.com --password 'S3cret!'
//!
//! # Who am I? Re-validates the saved session against the server
//! recette whoami --pretty
//!
//! # My desserts
//! recette recipe mine --category dessert
//!
//! # Quick dishes, under 30 minutes all told
//! recette recipe list --max-time 30
//!
//! # Rename one of my recipes
//! recette recipe update 12 --data '{"title": "Tarte Tatin de mamie"}'
//! ```

mod cli;
mod commands;
mod recipe_commands;

use crate::{cli::Cli, commands::Commands, recipe_commands::RecipeCommands};

use rc_cli::{App, CliClientResult, ClientError, RecipeFilter, logger};
use rc_config::Config;
use rc_session::{FileStorage, SessionStore};

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::initialize(
        config.logging.level,
        config.logging.file.as_deref().map(Path::new),
        config.logging.colored,
    ) {
        eprintln!("Warning: {}", e);
    }
    config.log_summary();

    // Server URL: explicit flag > RECETTE_API_URL / config > local default
    let server_url = cli
        .server
        .unwrap_or_else(|| config.api.base_url_or_default().to_string());

    let app = match open_app(&config, &server_url) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&app, cli.command).await;

    match result {
        Ok(value) => {
            let output = if cli.pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };

            match output {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error serializing response: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let ClientError::Session { source } = &e {
                eprintln!("{}", source.recovery_hint());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(app: &App, command: Commands) -> CliClientResult<serde_json::Value> {
    match command {
        Commands::Login { email, password } => app.login(&email, &password).await,
        Commands::Logout => app.logout(),
        Commands::Whoami => app.whoami().await,
        Commands::Recipe { action } => match action {
            RecipeCommands::List { filter } => app.list_recipes(&RecipeFilter::from(filter)).await,
            RecipeCommands::Mine { filter } => app.my_recipes(RecipeFilter::from(filter)).await,
            RecipeCommands::Get { id } => app.get_recipe(id).await,
            RecipeCommands::Create { data } => {
                app.create_recipe(serde_json::from_str(&data)?).await
            }
            RecipeCommands::Update { id, data } => {
                app.update_recipe(id, serde_json::from_str(&data)?).await
            }
            RecipeCommands::Delete { id } => app.delete_recipe(id).await,
        },
    }
}

fn load_config() -> CliClientResult<Config> {
    let config = Config::load().map_err(|e| ClientError::setup(e.to_string()))?;
    config
        .validate()
        .map_err(|e| ClientError::setup(e.to_string()))?;
    Ok(config)
}

/// Open the saved session and wire it to the server.
fn open_app(config: &Config, server_url: &str) -> CliClientResult<App> {
    let session_path = config
        .session_path()
        .map_err(|e| ClientError::setup(e.to_string()))?;

    let store = SessionStore::open(Arc::new(FileStorage::new(session_path)));
    Ok(App::new(Arc::new(store), server_url, config.api.timeout()))
}
