use crate::{CliClientResult, ClientError, resolve_base_url};

use rc_config::API_PREFIX;
use rc_session::{IdentityLookup, SessionResult};

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// HTTP client for the Recette REST API
pub struct Client {
    pub base_url: String,
    pub token: Option<String>,
    client: ReqwestClient,
}

impl Client {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Server root (e.g., "http://127.0.0.1:8000"); `/api/v1` is appended per request
    /// * `token` - Bearer token; blank tokens are treated as absent
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self::from_parts(base_url, token, ReqwestClient::new())
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(
        base_url: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> CliClientResult<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self::from_parts(base_url, token, client))
    }

    fn from_parts(base_url: &str, token: Option<&str>, client: ReqwestClient) -> Self {
        Self {
            base_url: resolve_base_url(base_url),
            token: token
                .filter(|token| !token.trim().is_empty())
                .map(String::from),
            client,
        }
    }

    /// Build a request, attaching the client's bearer token when it has one
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.request_with_token(method, path, self.token.as_deref())
    }

    /// Build a request with an explicit bearer token. No token, no header.
    fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, path);
        let req = self.client.request(method, &url);

        match token.filter(|token| !token.trim().is_empty()) {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Execute request and handle errors
    async fn execute(&self, req: reqwest::RequestBuilder) -> CliClientResult<Value> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!("{} ({} bytes)", status, text.len());

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(ClientError::from_json(e)),
                Err(_) => Value::String(text),
            }
        };

        if !status.is_success() {
            return Err(ClientError::api_error(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        Ok(body)
    }

    // =========================================================================
    // Auth Operations
    // =========================================================================

    /// Exchange credentials for an access token
    ///
    /// Returns the raw body: `{ access_token, token_type, user }`.
    pub async fn login(&self, email: &str, password: &str) -> CliClientResult<Value> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let body = LoginRequest { email, password };
        let req = self
            .request_with_token(Method::POST, "/auth/login", None)
            .json(&body);
        self.execute(req).await
    }

    /// Profile of the user owning the client's token
    pub async fn current_user(&self) -> CliClientResult<Value> {
        let req = self.request(Method::GET, "/auth/me");
        self.execute(req).await
    }

    // =========================================================================
    // Recipe Operations
    // =========================================================================

    /// List all recipes
    pub async fn list_recipes(&self) -> CliClientResult<Value> {
        let req = self.request(Method::GET, "/recipes");
        self.execute(req).await
    }

    /// Get a recipe by ID
    pub async fn get_recipe(&self, id: u64) -> CliClientResult<Value> {
        let req = self.request(Method::GET, &format!("/recipes/{}", id));
        self.execute(req).await
    }

    /// Create a recipe owned by the token's user
    ///
    /// # Arguments
    /// * `recipe` - `{ title, description, ingredients, steps, ... }`
    pub async fn create_recipe(&self, recipe: &Value) -> CliClientResult<Value> {
        let req = self.request(Method::POST, "/recipes").json(recipe);
        self.execute(req).await
    }

    /// Update a recipe (owner only). Fields left out are unchanged.
    pub async fn update_recipe(&self, id: u64, changes: &Value) -> CliClientResult<Value> {
        let req = self
            .request(Method::PUT, &format!("/recipes/{}", id))
            .json(changes);
        self.execute(req).await
    }

    /// Delete a recipe (owner only)
    pub async fn delete_recipe(&self, id: u64) -> CliClientResult<Value> {
        let req = self.request(Method::DELETE, &format!("/recipes/{}", id));
        self.execute(req).await
    }
}

#[async_trait]
impl IdentityLookup for Client {
    async fn lookup_identity(&self, token: &str) -> SessionResult<Value> {
        let req = self.request_with_token(Method::GET, "/auth/me", Some(token));
        Ok(self.execute(req).await?)
    }
}

/// Pull a readable message out of an error body.
///
/// The API reports `{"detail": "..."}`, or a list of `{"msg": ...}` entries
/// for validation failures.
fn error_message(status: StatusCode, body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.get("msg")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => match body {
            Value::String(text) => text.clone(),
            _ => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        },
    }
}
