use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;
use super::record::CredentialRecord;
use super::record::PasswordScheme;
use crate::config::ConfigurationError;
use crate::config::PasswordConfig;

/// Lowest and highest cost factors bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Password hashing implementation.
///
/// Hashes with the configured scheme (bcrypt by default, cost 12). Verification
/// follows the scheme embedded in each record, so records written under an
/// older configuration keep working.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    scheme: PasswordScheme,
    cost: u32,
}

impl PasswordHasher {
    /// Create a bcrypt hasher with the default cost factor.
    pub fn new() -> Self {
        Self {
            scheme: PasswordScheme::Bcrypt,
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Build a hasher from validated password configuration.
    pub fn from_config(config: &PasswordConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        Ok(Self::new().with_scheme(config.scheme).with_cost(config.cost))
    }

    pub fn with_scheme(mut self, scheme: PasswordScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the bcrypt cost factor. Out of range values fail at `hash` time.
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn scheme(&self) -> PasswordScheme {
        self.scheme
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// bcrypt only reads the first 72 bytes of its input.
    ///
    /// # Errors
    /// * `HashingFailed` - the cost factor is out of range or the primitive
    ///   failed
    pub fn hash(&self, password: &str) -> Result<CredentialRecord, PasswordError> {
        let encoded = match self.scheme {
            PasswordScheme::Bcrypt => bcrypt::hash(password, self.cost)
                .map_err(|e| PasswordError::HashingFailed(e.to_string()))?,
            PasswordScheme::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);

                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            }
        };

        Ok(CredentialRecord::new(encoded))
    }

    /// Verify a password against a stored record.
    ///
    /// Digest comparison is constant time in both primitives. A record that
    /// cannot be parsed verifies as `false`.
    pub fn verify(&self, password: &str, record: &CredentialRecord) -> bool {
        match record.scheme() {
            Some(PasswordScheme::Bcrypt) => match bcrypt::verify(password, record.as_str()) {
                Ok(valid) => valid,
                Err(e) => {
                    tracing::warn!(error = %e, scheme = "bcrypt", "Unreadable credential record");
                    false
                }
            },
            Some(PasswordScheme::Argon2id) => match PasswordHash::new(record.as_str()) {
                Ok(parsed_hash) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
                Err(e) => {
                    tracing::warn!(error = %e, scheme = "argon2id", "Unreadable credential record");
                    false
                }
            },
            None => {
                tracing::warn!("Credential record has an unknown scheme");
                false
            }
        }
    }

    /// Whether `record` should be replaced by a fresh hash under the current
    /// scheme and cost.
    pub fn needs_rehash(&self, record: &CredentialRecord) -> bool {
        match (self.scheme, record.scheme()) {
            (PasswordScheme::Bcrypt, Some(PasswordScheme::Bcrypt)) => {
                record.bcrypt_cost() != Some(self.cost)
            }
            (PasswordScheme::Argon2id, Some(PasswordScheme::Argon2id)) => false,
            _ => true,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
