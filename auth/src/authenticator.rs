use chrono::Duration;

use crate::bearer::extract_bearer_token;
use crate::bearer::BearerError;
use crate::config::AuthConfig;
use crate::config::ConfigurationError;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::password::CredentialRecord;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token
/// issuance.
///
/// Registration hashes passwords, login verifies them and issues a token, and
/// protected routes authorize the bearer header.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    decoy_record: Option<CredentialRecord>,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Signed access token
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: &'static str,
    /// Unix timestamp after which the token is rejected
    pub expires_at: i64,
    /// The stored record uses an outdated scheme or cost; replace it with
    /// `hash_password` while the plaintext is at hand
    pub needs_rehash: bool,
}

/// Principal resolved from a valid bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub subject: String,
    pub claims: Claims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("JWT error: {0}")]
    Token(#[from] JwtError),

    #[error("Authorization header error: {0}")]
    Bearer(#[from] BearerError),

    #[error("Token has no subject")]
    MissingSubject,
}

impl AuthenticationError {
    /// Message safe to return to an HTTP client.
    ///
    /// Unknown users and wrong passwords read the same.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthenticationError::InvalidCredentials => "Invalid credentials",
            AuthenticationError::Password(_) => "Internal error",
            AuthenticationError::Token(e) => e.client_message(),
            AuthenticationError::Bearer(BearerError::Missing) => "Missing Authorization header",
            AuthenticationError::Bearer(_) => {
                "Invalid Authorization header format. Expected: Bearer <token>"
            }
            AuthenticationError::MissingSubject => "Invalid token",
        }
    }
}

impl Authenticator {
    /// Create an authenticator from preconfigured components.
    ///
    /// Hashes a throwaway password up front for [`Self::reject_unknown_principal`].
    pub fn from_parts(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        let decoy_record = match password_hasher.hash("decoy-password") {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(error = %e, "Failed to hash decoy password");
                None
            }
        };

        Self {
            password_hasher,
            token_codec,
            decoy_record,
        }
    }

    /// Create an authenticator from validated configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigurationError> {
        Ok(Self::from_parts(
            PasswordHasher::from_config(&config.password)?,
            TokenCodec::from_config(&config.jwt)?,
        ))
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<CredentialRecord, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token with the default lifetime.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `Token` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        record: &CredentialRecord,
        claims: Claims,
    ) -> Result<LoginResult, AuthenticationError> {
        if !self.password_hasher.verify(password, record) {
            tracing::info!(
                subject = claims.sub.as_deref().unwrap_or("-"),
                "Login rejected: password mismatch"
            );
            return Err(AuthenticationError::InvalidCredentials);
        }

        let issued = self.token_codec.issue_token(claims, None)?;

        Ok(LoginResult {
            access_token: issued.token,
            token_type: "bearer",
            expires_at: issued.expires_at,
            needs_rehash: self.password_hasher.needs_rehash(record),
        })
    }

    /// Reject a login for a principal that does not exist.
    ///
    /// Runs a verification against a throwaway record first so the response
    /// takes as long as a wrong password would.
    pub fn reject_unknown_principal(&self, password: &str) -> AuthenticationError {
        match &self.decoy_record {
            Some(decoy) => {
                let _ = self.password_hasher.verify(password, decoy);
            }
            // Hashing costs the same as verifying at equal cost.
            None => {
                let _ = self.password_hasher.hash(password);
            }
        }
        tracing::info!("Login rejected: unknown principal");

        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// For refresh flows or principals already authenticated by other means.
    pub fn generate_token(
        &self,
        claims: Claims,
        ttl: Option<Duration>,
    ) -> Result<String, JwtError> {
        self.token_codec.issue(claims, ttl)
    }

    /// Verify a token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_codec.verify(token)
    }

    /// Resolve the principal behind an `Authorization` header value.
    ///
    /// # Errors
    /// * `Bearer` - header absent or not a bearer credential
    /// * `Token` - token malformed, forged or expired
    /// * `MissingSubject` - token carries no `sub` claim
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Principal, AuthenticationError> {
        let token = extract_bearer_token(authorization)?;
        let claims = self.token_codec.verify(token)?;

        let subject = claims.sub.clone().ok_or_else(|| {
            tracing::warn!("Token without 'sub' claim");
            AuthenticationError::MissingSubject
        })?;

        Ok(Principal { subject, claims })
    }
}
