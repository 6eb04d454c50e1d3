use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "recette")]
#[command(about = "Recette recipe-sharing client")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Server URL (defaults to config, RECETTE_API_URL, or http://localhost:8000)
    #[arg(long, global = true)]
    pub(crate) server: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}
