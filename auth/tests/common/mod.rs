#![allow(dead_code)]

use std::sync::Arc;

use payit_auth::password::hasher::MIN_BCRYPT_COST;
use payit_auth::Authenticator;
use payit_auth::FixedClock;
use payit_auth::PasswordHasher;
use payit_auth::TokenCodec;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const OTHER_SECRET: &[u8] = b"another-secret-key-for-jwt-signing-32-bytes";

/// 2023-11-14T22:13:20Z
pub const NOW: i64 = 1_700_000_000;

/// Codec on a manual clock starting at `NOW`.
pub fn codec() -> (TokenCodec, Arc<FixedClock>) {
    codec_with_secret(SECRET)
}

pub fn codec_with_secret(secret: &[u8]) -> (TokenCodec, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(NOW));
    let codec = TokenCodec::new(secret).with_clock(clock.clone());
    (codec, clock)
}

/// bcrypt at the lowest cost so tests stay fast.
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new().with_cost(MIN_BCRYPT_COST)
}

pub fn authenticator() -> (Authenticator, Arc<FixedClock>) {
    let (codec, clock) = codec();
    (Authenticator::from_parts(fast_hasher(), codec), clock)
}

/// Split a token into its three segments.
pub fn segments(token: &str) -> (String, String, String) {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "token should have three segments");
    (
        parts[0].to_string(),
        parts[1].to_string(),
        parts[2].to_string(),
    )
}
