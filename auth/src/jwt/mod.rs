pub mod algorithm;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod errors;

pub use algorithm::SigningAlgorithm;
pub use claims::Claims;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use codec::IssuedToken;
pub use codec::TokenCodec;
pub use errors::JwtError;
