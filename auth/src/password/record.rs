use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Hash families a credential record can be stored under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Bcrypt,
    Argon2id,
}

/// Stored password representation.
///
/// Holds the self-describing encoded hash: bcrypt MCF (`$2b$12$...`) or Argon2
/// PHC (`$argon2id$...`). Algorithm, cost and salt travel inside the string.
/// `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRecord(String);

impl CredentialRecord {
    /// Wrap an encoded hash loaded from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme named by the record prefix, if recognised.
    pub fn scheme(&self) -> Option<PasswordScheme> {
        let encoded = self.0.as_str();

        if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|prefix| encoded.starts_with(prefix))
        {
            Some(PasswordScheme::Bcrypt)
        } else if encoded.starts_with("$argon2id$") {
            Some(PasswordScheme::Argon2id)
        } else {
            None
        }
    }

    /// Cost factor of a bcrypt record.
    pub fn bcrypt_cost(&self) -> Option<u32> {
        if self.scheme() != Some(PasswordScheme::Bcrypt) {
            return None;
        }

        self.0.split('$').nth(2).and_then(|cost| cost.parse().ok())
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialRecord")
            .field(&"[REDACTED]")
            .finish()
    }
}
