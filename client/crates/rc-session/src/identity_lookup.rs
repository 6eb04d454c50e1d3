use crate::SessionResult;

use async_trait::async_trait;
use serde_json::Value;

/// The server's "who am I" endpoint.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Fetch the profile for `token`. Any error means the session is unusable.
    async fn lookup_identity(&self, token: &str) -> SessionResult<Value>;
}
