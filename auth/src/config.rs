use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

use crate::jwt::codec::DEFAULT_TOKEN_TTL_MINUTES;
use crate::jwt::SigningAlgorithm;
use crate::password::hasher::MAX_BCRYPT_COST;
use crate::password::hasher::MIN_BCRYPT_COST;
use crate::password::PasswordScheme;

/// Shortest accepted signing secret, matching the HS256 digest size.
pub const MIN_SECRET_BYTES: usize = 32;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize)]
pub struct JwtConfig {
    /// HMAC key. Never logged: `Debug` prints it redacted.
    pub secret: Secret<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    #[serde(default)]
    pub scheme: PasswordScheme,
    #[serde(default = "default_cost")]
    pub cost: u32,
}

fn default_algorithm() -> String {
    SigningAlgorithm::default().to_string()
}

fn default_expiration_minutes() -> i64 {
    DEFAULT_TOKEN_TTL_MINUTES
}

fn default_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            scheme: PasswordScheme::default(),
            cost: default_cost(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, PASSWORD__COST, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// There is no built-in secret; `jwt.secret` must come from one of these.
    pub fn load() -> Result<Self, ConfigurationError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: AuthConfig = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.jwt.validate()?;
        self.password.validate()
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let secret_len = self.secret.expose_secret().len();
        if secret_len < MIN_SECRET_BYTES {
            return Err(ConfigurationError::Invalid {
                field: "jwt.secret",
                reason: format!("must be at least {MIN_SECRET_BYTES} bytes, got {secret_len}"),
            });
        }

        self.signing_algorithm()?;

        if self.expiration_minutes <= 0 {
            return Err(ConfigurationError::Invalid {
                field: "jwt.expiration_minutes",
                reason: format!("must be positive, got {}", self.expiration_minutes),
            });
        }

        Ok(())
    }

    pub fn signing_algorithm(&self) -> Result<SigningAlgorithm, ConfigurationError> {
        self.algorithm
            .parse::<SigningAlgorithm>()
            .map_err(|reason| ConfigurationError::Invalid {
                field: "jwt.algorithm",
                reason,
            })
    }
}

impl PasswordConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.scheme == PasswordScheme::Bcrypt
            && !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.cost)
        {
            return Err(ConfigurationError::Invalid {
                field: "password.cost",
                reason: format!(
                    "must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {}",
                    self.cost
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "07c58ada9b9ce6bd36d679c77a81b5da9e7cf79593047c8b64bb79f0552f7f58";

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: Secret::new(SECRET.to_string()),
            algorithm: "HS256".to_string(),
            expiration_minutes: 60,
        }
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("JWT__SECRET", Some(SECRET)),
                ("JWT__ALGORITHM", Some("HS512")),
                ("JWT__EXPIRATION_MINUTES", Some("30")),
                ("PASSWORD__COST", Some("10")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AuthConfig::load().expect("Failed to load config");

                assert_eq!(config.jwt.secret.expose_secret(), SECRET);
                assert_eq!(
                    config.jwt.signing_algorithm().unwrap(),
                    SigningAlgorithm::Hs512
                );
                assert_eq!(config.jwt.expiration_minutes, 30);
                assert_eq!(config.password.cost, 10);
                assert_eq!(config.password.scheme, PasswordScheme::Bcrypt);
            },
        );
    }

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("JWT__SECRET", Some(SECRET)),
                ("JWT__ALGORITHM", None),
                ("JWT__EXPIRATION_MINUTES", None),
                ("PASSWORD__COST", None),
                ("PASSWORD__SCHEME", None),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AuthConfig::load().expect("Failed to load config");

                assert_eq!(config.jwt.algorithm, "HS256");
                assert_eq!(config.jwt.expiration_minutes, 60);
                assert_eq!(config.password.cost, 12);
            },
        );
    }

    #[test]
    fn test_load_requires_secret() {
        temp_env::with_vars(
            [("JWT__SECRET", None::<&str>), ("RUN_MODE", Some("test"))],
            || {
                assert!(AuthConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_secret_is_redacted() {
        let debug = format!("{:?}", jwt_config());
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_validate_short_secret() {
        let config = JwtConfig {
            secret: Secret::new("too-short".to_string()),
            ..jwt_config()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Invalid {
                field: "jwt.secret",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_algorithm() {
        let config = JwtConfig {
            algorithm: "RS256".to_string(),
            ..jwt_config()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Invalid {
                field: "jwt.algorithm",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_expiration() {
        let config = JwtConfig {
            expiration_minutes: 0,
            ..jwt_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cost_range() {
        let mut config = PasswordConfig::default();
        assert!(config.validate().is_ok());

        config.cost = 3;
        assert!(config.validate().is_err());

        config.cost = 32;
        assert!(config.validate().is_err());

        config.scheme = PasswordScheme::Argon2id;
        assert!(config.validate().is_ok());
    }
}
