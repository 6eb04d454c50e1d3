pub(crate) mod base_url;
pub(crate) mod client;
pub(crate) mod error;

pub use base_url::resolve_base_url;
pub use client::Client;
pub use error::{ClientError, Result as CliClientResult};
