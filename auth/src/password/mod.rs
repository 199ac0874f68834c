pub mod errors;
pub mod hasher;
pub mod record;

pub use errors::PasswordError;
pub use hasher::PasswordHasher;
pub use record::CredentialRecord;
pub use record::PasswordScheme;
