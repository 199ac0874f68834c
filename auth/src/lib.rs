//! Authentication core for the PayIt marketplace backend
//!
//! Provides the pieces the HTTP layer calls into:
//! - Password hashing (bcrypt, with Argon2id records still verifiable)
//! - Signed bearer token issuance and verification (HMAC JWT)
//! - `Authorization: Bearer` header parsing
//! - A login coordinator tying the above together
//!
//! Every component is built from an explicit configuration value; nothing
//! reads global state after construction.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use payit_auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new().with_cost(4);
//! let record = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &record));
//! assert!(!hasher.verify("not_my_password", &record));
//! ```
//!
//! ## Tokens
//! ```
//! use payit_auth::{Claims, TokenCodec};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.issue(Claims::new().with_subject("42"), None).unwrap();
//! let claims = codec.verify(&token).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("42"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use payit_auth::{Authenticator, Claims, PasswordHasher, TokenCodec};
//!
//! let auth = Authenticator::from_parts(
//!     PasswordHasher::new().with_cost(4),
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!"),
//! );
//!
//! // Register: hash password
//! let record = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let login = auth
//!     .authenticate("password123", &record, Claims::for_user(4, "samuel@example.com"))
//!     .unwrap();
//!
//! // Protected route: authorize the bearer header
//! let header = format!("Bearer {}", login.access_token);
//! let principal = auth.authorize(Some(header.as_str())).unwrap();
//! assert_eq!(principal.subject, "4");
//! ```

pub mod authenticator;
pub mod bearer;
pub mod config;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::LoginResult;
pub use authenticator::Principal;
pub use bearer::extract_bearer_token;
pub use bearer::BearerError;
pub use crate::config::AuthConfig;
pub use crate::config::ConfigurationError;
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::FixedClock;
pub use jwt::JwtError;
pub use jwt::SigningAlgorithm;
pub use jwt::SystemClock;
pub use jwt::TokenCodec;
pub use password::CredentialRecord;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordScheme;
