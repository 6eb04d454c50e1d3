use std::fmt;
use std::num::NonZeroU64;

use serde::Serialize;
use serde_json::Value;

/// Largest user id accepted: 2^53, the last integer a JSON number carries
/// without loss.
const MAX_USER_ID: u64 = 1 << 53;

/// The signed-in user as known to this client.
///
/// Build one from untrusted input with [`Identity::from_value`] or
/// [`Identity::from_login_response`]; both reject anything without a token
/// and an email. Hand-built values go through [`Identity::normalize`] before
/// the store accepts them.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Option<NonZeroU64>,
    pub email: String,
    pub username: String,
    pub token: String,
    pub profile_picture: Option<String>,
}

impl Identity {
    /// Validating constructor for a durable record or any other JSON object.
    ///
    /// Returns `None` when `token` or `email` is missing, empty or not a string.
    /// `profilePicture` is accepted as an alias of `profile_picture`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let token = non_empty_str(object.get("token"))?;
        let email = non_empty_str(object.get("email"))?;

        Self {
            id: object.get("id").and_then(coerce_user_id),
            email: email.to_string(),
            username: non_empty_str(object.get("username"))
                .unwrap_or_default()
                .to_string(),
            token: token.to_string(),
            profile_picture: picture_field(value).map(String::from),
        }
        .normalize()
    }

    /// Parse a serialized record. Malformed input yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Value>(raw)
            .ok()
            .as_ref()
            .and_then(Self::from_value)
    }

    /// Build an identity from a `POST /auth/login` response body.
    ///
    /// `submitted_email` stands in when the response carries no user email.
    pub fn from_login_response(submitted_email: &str, body: &Value) -> Option<Self> {
        let token = non_empty_str(body.get("access_token"))?;
        let user = body.get("user").unwrap_or(&Value::Null);

        let email = non_empty_str(user.get("email")).unwrap_or(submitted_email);

        Self {
            id: user.get("id").and_then(coerce_user_id),
            email: email.to_string(),
            username: non_empty_str(user.get("username"))
                .unwrap_or_default()
                .to_string(),
            token: token.to_string(),
            profile_picture: picture_field(user).map(String::from),
        }
        .normalize()
    }

    /// Apply the defaulting rules; `None` if the identity cannot be retained.
    ///
    /// Normalizing an already-normalized identity returns it unchanged.
    pub fn normalize(mut self) -> Option<Self> {
        if is_blank(&self.token) || is_blank(&self.email) {
            return None;
        }

        if is_blank(&self.username) {
            self.username = self.email.clone();
        }

        if self.profile_picture.as_deref().is_some_and(is_blank) {
            self.profile_picture = None;
        }

        Some(self)
    }

    /// Merge an identity-lookup response into this identity.
    ///
    /// `id` comes from the response alone; the other profile fields fall back
    /// to the current values. The token never changes.
    pub fn merge_lookup(&self, body: &Value) -> Option<Self> {
        Self {
            id: body.get("id").and_then(coerce_user_id),
            email: non_empty_str(body.get("email"))
                .unwrap_or(self.email.as_str())
                .to_string(),
            username: non_empty_str(body.get("username"))
                .unwrap_or(self.username.as_str())
                .to_string(),
            token: self.token.clone(),
            profile_picture: picture_field(body)
                .map(String::from)
                .or_else(|| self.profile_picture.clone()),
        }
        .normalize()
    }

    /// Whether the server-assigned fields are known.
    pub fn is_complete(&self) -> bool {
        self.id.is_some() && !is_blank(&self.username)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("profile_picture", &self.profile_picture)
            .finish()
    }
}

/// Coerce a JSON value into a positive user id.
///
/// Accepts integers, integral floats and numeric strings up to 2^53.
/// Anything else, including zero and negatives, is absent.
pub fn coerce_user_id(value: &Value) -> Option<NonZeroU64> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                return user_id(n);
            }
            if number.is_i64() {
                return None;
            }
            number.as_f64().and_then(integral_float)
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => user_id(n),
                Err(_) => s.parse::<f64>().ok().and_then(integral_float),
            }
        }
        _ => None,
    }
}

fn user_id(n: u64) -> Option<NonZeroU64> {
    NonZeroU64::new(n).filter(|id| id.get() <= MAX_USER_ID)
}

fn integral_float(f: f64) -> Option<NonZeroU64> {
    if f.is_finite() && f.fract() == 0.0 && f > 0.0 && f <= MAX_USER_ID as f64 {
        user_id(f as u64)
    } else {
        None
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !is_blank(s))
}

fn picture_field(value: &Value) -> Option<&str> {
    non_empty_str(value.get("profile_picture"))
        .or_else(|| non_empty_str(value.get("profilePicture")))
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
