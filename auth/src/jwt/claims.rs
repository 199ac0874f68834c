use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Claim names the codec manages itself.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "exp", "iat"];

/// JWT claim set.
///
/// `sub`, `exp` and `iat` are typed; application claims live in `extra`,
/// which is flattened into the payload. `extra` is ordered so the same claims
/// always serialize to the same bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (principal identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp), set by the codec on issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Application-specific claims
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,

    /// First claim passed to `with_extra` that failed to serialize.
    #[serde(skip)]
    pub(crate) unencodable: Option<String>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims carried by a marketplace login: the user id as subject plus
    /// `email` and `user_id` for handlers that avoid a database lookup.
    pub fn for_user(user_id: impl ToString, email: impl Into<String>) -> Self {
        let user_id = user_id.to_string();

        Self::new()
            .with_subject(user_id.clone())
            .with_extra("email", email.into())
            .with_extra("user_id", user_id)
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Add a custom claim.
    ///
    /// A value that does not serialize is not stored; issuing the claims then
    /// fails with `EncodingFailure`.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        let key = key.to_string();

        match serde_json::to_value(value) {
            Ok(json_value) => {
                self.extra.insert(key, json_value);
            }
            Err(e) => {
                self.unencodable
                    .get_or_insert_with(|| format!("claim '{key}' cannot be serialized: {e}"));
            }
        }
        self
    }

    /// Email claim set by [`Claims::for_user`].
    pub fn email(&self) -> Option<&str> {
        self.extra.get("email").and_then(|v| v.as_str())
    }

    /// Check if the claims are expired at `current_timestamp`.
    ///
    /// A token expires at its `exp` instant, not one second after. Claims
    /// without `exp` are treated as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(true, |exp| exp <= current_timestamp)
    }

    /// Reject claim sets that cannot be carried in a token payload.
    pub(crate) fn ensure_encodable(&self) -> Result<(), JwtError> {
        if let Some(reason) = &self.unencodable {
            return Err(JwtError::EncodingFailure(reason.clone()));
        }

        for (key, value) in &self.extra {
            if RESERVED_CLAIMS.contains(&key.as_str()) {
                return Err(JwtError::EncodingFailure(format!(
                    "claim '{key}' is reserved"
                )));
            }

            if value.is_array() || value.is_object() {
                return Err(JwtError::EncodingFailure(format!(
                    "claim '{key}' is not a primitive value"
                )));
            }
        }

        Ok(())
    }
}
