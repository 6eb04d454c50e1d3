use crate::{CliClientResult, Client, ClientError, RecipeFilter};

use rc_session::{Identity, ReconcileOutcome, Reconciler, SessionStore};

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde_json::{Value, json};

/// Commands run against one server with one session store.
///
/// Every authenticated request carries the store's current token; a 401
/// from the server ends the session.
pub struct App {
    store: Arc<SessionStore>,
    server_url: String,
    timeout: Duration,
}

impl App {
    pub fn new(store: Arc<SessionStore>, server_url: &str, timeout: Duration) -> Self {
        Self {
            store,
            server_url: server_url.to_string(),
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Client carrying the current bearer token, if any
    fn client(&self) -> CliClientResult<Client> {
        Client::with_timeout(&self.server_url, self.store.token().as_deref(), self.timeout)
    }

    /// Sign in, persist the identity, then resolve any missing profile fields.
    pub async fn login(&self, email: &str, password: &str) -> CliClientResult<Value> {
        let client = Client::with_timeout(&self.server_url, None, self.timeout)?;
        let body = client.login(email, password).await?;

        let identity = Identity::from_login_response(email, &body)
            .ok_or_else(|| ClientError::invalid_response("login response has no access token"))?;

        self.store.login(identity)?;
        self.reconcile().await?;

        self.signed_in_identity().map(|identity| identity_json(&identity))
    }

    pub fn logout(&self) -> CliClientResult<Value> {
        self.store.logout()?;
        Ok(json!({ "signed_in": false }))
    }

    /// The signed-in identity, reconciled with the server if incomplete.
    pub async fn whoami(&self) -> CliClientResult<Value> {
        self.reconcile().await?;
        self.signed_in_identity().map(|identity| identity_json(&identity))
    }

    pub async fn list_recipes(&self, filter: &RecipeFilter) -> CliClientResult<Value> {
        let recipes = self.authorized(self.client()?.list_recipes().await)?;
        Ok(filter.apply(recipes))
    }

    pub async fn get_recipe(&self, id: u64) -> CliClientResult<Value> {
        self.authorized(self.client()?.get_recipe(id).await)
    }

    pub async fn create_recipe(&self, recipe: Value) -> CliClientResult<Value> {
        require_object(&recipe)?;
        self.signed_in_identity()?;
        self.authorized(self.client()?.create_recipe(&recipe).await)
    }

    pub async fn update_recipe(&self, id: u64, changes: Value) -> CliClientResult<Value> {
        require_object(&changes)?;
        self.signed_in_identity()?;
        self.authorized(self.client()?.update_recipe(id, &changes).await)
    }

    pub async fn delete_recipe(&self, id: u64) -> CliClientResult<Value> {
        self.signed_in_identity()?;
        self.authorized(self.client()?.delete_recipe(id).await)?;
        Ok(json!({ "deleted": id }))
    }

    /// Recipes owned by the signed-in user.
    ///
    /// Needs a resolved user id; a session without one is ended.
    pub async fn my_recipes(&self, filter: RecipeFilter) -> CliClientResult<Value> {
        self.reconcile().await?;
        let identity = self.signed_in_identity()?;

        let Some(owner_id) = identity.id else {
            warn!("Signed-in identity has no user id, signing out");
            self.store.logout()?;
            return Err(ClientError::not_signed_in());
        };

        self.list_recipes(&filter.owned_by(owner_id)).await
    }

    async fn reconcile(&self) -> CliClientResult<ReconcileOutcome> {
        let lookup = Arc::new(Client::with_timeout(&self.server_url, None, self.timeout)?);
        let outcome = Reconciler::new(self.store.clone(), lookup).reconcile().await;

        if outcome == ReconcileOutcome::LoggedOut {
            info!("Server rejected the saved session");
        }
        Ok(outcome)
    }

    fn signed_in_identity(&self) -> CliClientResult<Identity> {
        let Some(identity) = self.store.current() else {
            return Err(ClientError::not_signed_in());
        };
        Ok(identity)
    }

    /// End the session when the server says the token is no longer valid.
    fn authorized<T>(&self, result: CliClientResult<T>) -> CliClientResult<T> {
        match result {
            Err(e) if e.is_unauthorized() => {
                warn!("Request rejected as unauthorized, signing out");
                if let Err(e) = self.store.logout() {
                    warn!("Could not clear session: {e}");
                }
                Err(ClientError::session_expired())
            }
            other => other,
        }
    }
}

fn require_object(body: &Value) -> CliClientResult<()> {
    if body.is_object() {
        Ok(())
    } else {
        Err(ClientError::invalid_input("recipe data must be a JSON object"))
    }
}

/// Public view of an identity. The token is never printed.
pub fn identity_json(identity: &Identity) -> Value {
    json!({
        "id": identity.id,
        "email": identity.email,
        "username": identity.username,
        "profile_picture": identity.profile_picture,
        "complete": identity.is_complete(),
    })
}
