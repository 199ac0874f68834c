use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use secrecy::ExposeSecret;

use super::algorithm::SigningAlgorithm;
use super::claims::Claims;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::JwtError;
use crate::config::ConfigurationError;
use crate::config::JwtConfig;

/// Lifetime applied when `issue` is called without one.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Unix timestamp copied into the `exp` claim
    pub expires_at: i64,
}

/// Issues and verifies HMAC-signed bearer tokens.
///
/// The signing algorithm is fixed at construction and is the only one accepted
/// on verification, whatever the token header claims. Expiry is checked
/// against the injected [`Clock`], and a token is dead at its `exp` instant.
///
/// The codec is immutable and `Send + Sync`; share it behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: SigningAlgorithm,
    validation: Validation,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec signing with HS256 and a 60 minute default lifetime.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration, never from source code
    /// - Changing it invalidates every token issued before
    pub fn new(secret: &[u8]) -> Self {
        let algorithm = SigningAlgorithm::default();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation: pinned_validation(algorithm),
            default_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            clock: Arc::new(SystemClock),
        }
    }

    /// Build a codec from validated JWT configuration.
    pub fn from_config(config: &JwtConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let algorithm = config.signing_algorithm()?;

        Ok(Self::new(config.secret.expose_secret().as_bytes())
            .with_algorithm(algorithm)
            .with_default_ttl(Duration::minutes(config.expiration_minutes)))
    }

    /// Sign and verify with `algorithm` instead of HS256.
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self.validation = pinned_validation(algorithm);
        self
    }

    /// Lifetime used when `issue` gets no explicit ttl.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Read the current instant from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign `claims` into a token that expires `ttl` from now.
    ///
    /// Any `exp` already present in `claims` is replaced.
    ///
    /// # Errors
    /// * `EncodingFailure` - an extension claim is nested or reuses a reserved
    ///   name, or the payload could not be signed
    pub fn issue(&self, claims: Claims, ttl: Option<Duration>) -> Result<String, JwtError> {
        self.issue_token(claims, ttl).map(|issued| issued.token)
    }

    /// Like [`TokenCodec::issue`], also returning the expiry instant.
    pub fn issue_token(
        &self,
        mut claims: Claims,
        ttl: Option<Duration>,
    ) -> Result<IssuedToken, JwtError> {
        if let Err(e) = claims.ensure_encodable() {
            tracing::error!(error = %e, "Refusing to issue token");
            return Err(e);
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = self
            .clock
            .now()
            .checked_add(ttl.num_seconds())
            .ok_or_else(|| JwtError::EncodingFailure("token lifetime overflows".to_string()))?;
        claims.exp = Some(expires_at);

        let header = Header::new(self.algorithm.into());
        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Token encoding failed");
            JwtError::EncodingFailure(e.to_string())
        })?;

        tracing::debug!(
            subject = claims.sub.as_deref().unwrap_or("-"),
            expires_at,
            algorithm = %self.algorithm,
            "Token issued"
        );

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// * `MalformedToken` - not three segments, bad base64, payload not a JSON
    ///   object, or no numeric `exp`
    /// * `InvalidSignature` - signature mismatch or a header naming another
    ///   algorithm
    /// * `Expired` - `exp` is at or before the current instant
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let result = self.verify_inner(token);

        match &result {
            Err(e) if e.is_expired() => tracing::debug!("Token rejected: expired"),
            Err(e) => tracing::warn!(error = %e, "Token rejected"),
            Ok(_) => {}
        }

        result
    }

    fn verify_inner(&self, token: &str) -> Result<Claims, JwtError> {
        let token = normalize(token)?;

        let claims = decode::<Claims>(&token, &self.decoding_key, &self.validation)?.claims;

        if claims.exp.is_none() {
            return Err(JwtError::MalformedToken("missing 'exp' claim".to_string()));
        }

        if claims.is_expired(self.clock.now()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

/// Validation accepting only `algorithm`. Expiry is checked by the codec
/// against its own clock, without leeway.
fn pinned_validation(algorithm: SigningAlgorithm) -> Validation {
    let mut validation = Validation::new(algorithm.into());
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation
}

/// Check the three-segment shape and drop base64 padding so padded segments
/// decode like unpadded ones.
fn normalize(token: &str) -> Result<String, JwtError> {
    let segments: Vec<&str> = token
        .trim()
        .split('.')
        .map(|segment| segment.trim_end_matches('='))
        .collect();

    if segments.len() != 3 {
        return Err(JwtError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(JwtError::MalformedToken("empty segment".to_string()));
    }

    Ok(segments.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::clock::FixedClock;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";
    const NOW: i64 = 1_700_000_000;

    fn codec() -> (TokenCodec, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(NOW));
        let codec = TokenCodec::new(SECRET).with_clock(clock.clone());
        (codec, clock)
    }

    #[test]
    fn test_issue_and_verify() {
        let (codec, _) = codec();
        let claims = Claims::new().with_subject("user123").with_extra("role", "farmer");

        let token = codec.issue(claims.clone(), None).expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let decoded = codec.verify(&token).expect("Failed to verify token");
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.extra, claims.extra);
        assert_eq!(decoded.exp, Some(NOW + 60 * 60));
    }

    #[test]
    fn test_issue_is_deterministic() {
        let (codec, clock) = codec();
        let claims = Claims::new().with_subject("42").with_extra("b", 1).with_extra("a", 2);

        let first = codec.issue(claims.clone(), None).unwrap();
        let second = codec.issue(claims.clone(), None).unwrap();
        assert_eq!(first, second);

        clock.advance(Duration::seconds(1));
        let later = codec.issue(claims.clone(), None).unwrap();
        assert_ne!(first, later);

        let longer = codec.issue(claims, Some(Duration::minutes(5))).unwrap();
        assert_ne!(later, longer);
    }

    #[test]
    fn test_issue_overwrites_exp() {
        let (codec, _) = codec();
        let claims = Claims {
            exp: Some(1),
            ..Claims::new().with_subject("42")
        };

        let issued = codec.issue_token(claims, None).unwrap();
        assert_eq!(issued.expires_at, NOW + 3600);
        assert_eq!(codec.verify(&issued.token).unwrap().exp, Some(NOW + 3600));
    }

    #[test]
    fn test_issue_rejects_nested_claims() {
        let (codec, _) = codec();
        let claims = Claims::new().with_extra("tags", vec!["a", "b"]);

        assert!(matches!(
            codec.issue(claims, None),
            Err(JwtError::EncodingFailure(_))
        ));
    }

    #[test]
    fn test_verify_expired_at_exact_instant() {
        let (codec, clock) = codec();
        let token = codec.issue(Claims::new(), Some(Duration::seconds(30))).unwrap();

        clock.advance(Duration::seconds(29));
        assert!(codec.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(codec.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let (codec, _) = codec();
        let other = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!")
            .with_clock(Arc::new(FixedClock::new(NOW)));

        let token = codec.issue(Claims::new().with_subject("user123"), None).unwrap();
        assert_eq!(other.verify(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_other_algorithm() {
        let (codec, _) = codec();
        let hs512 = TokenCodec::new(SECRET)
            .with_algorithm(SigningAlgorithm::Hs512)
            .with_clock(Arc::new(FixedClock::new(NOW)));

        let token = hs512.issue(Claims::new().with_subject("1"), None).unwrap();
        assert!(hs512.verify(&token).is_ok());
        assert_eq!(codec.verify(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_tolerates_padding() {
        let (codec, _) = codec();
        let token = codec.issue(Claims::new().with_subject("pad"), None).unwrap();

        let padded: Vec<String> = token
            .split('.')
            .map(|segment| {
                let padding = (4 - segment.len() % 4) % 4;
                format!("{segment}{}", "=".repeat(padding))
            })
            .collect();

        let claims = codec.verify(&padded.join(".")).expect("Padded token rejected");
        assert_eq!(claims.sub.as_deref(), Some("pad"));
    }

    #[test]
    fn test_normalize_segment_count() {
        assert!(matches!(normalize("a.b"), Err(JwtError::MalformedToken(_))));
        assert!(matches!(normalize("a.b.c.d"), Err(JwtError::MalformedToken(_))));
        assert!(matches!(normalize("a..c"), Err(JwtError::MalformedToken(_))));
        assert_eq!(normalize(" a=.b==.c ").unwrap(), "a.b.c");
    }

    #[test]
    fn test_verify_invalid_token() {
        let (codec, _) = codec();
        let result = codec.verify("invalid.token.here");
        assert!(matches!(result, Err(JwtError::MalformedToken(_))));
    }

    #[test]
    fn test_from_config() {
        let config = JwtConfig {
            secret: secrecy::Secret::new("x".repeat(48)),
            algorithm: "HS384".to_string(),
            expiration_minutes: 15,
        };

        let codec = TokenCodec::from_config(&config).expect("Invalid config");
        assert_eq!(codec.algorithm(), SigningAlgorithm::Hs384);
        assert_eq!(codec.default_ttl(), Duration::minutes(15));
    }
}
