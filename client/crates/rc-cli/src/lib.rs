//! rc-cli library
//!
//! Exports the HTTP client and the session-aware command layer for use in
//! tests and the `recette` binary.

pub(crate) mod app;
pub(crate) mod client;
pub mod logger;
pub(crate) mod recipe_filter;


pub use app::{App, identity_json};
pub use client::{CliClientResult, Client, ClientError, resolve_base_url};
pub use recipe_filter::RecipeFilter;
