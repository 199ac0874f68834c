use thiserror::Error;

/// Error type for token operations.
///
/// Each variant is a distinct failure kind so callers can pick a response.
/// Use [`JwtError::client_message`] for anything shown to a client:
/// malformed and forged tokens share one message there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Failed to encode token: {0}")]
    EncodingFailure(String),
}

impl JwtError {
    /// Message safe to return to an HTTP client.
    pub fn client_message(&self) -> &'static str {
        match self {
            JwtError::Expired => "Token has expired",
            JwtError::MalformedToken(_) | JwtError::InvalidSignature => "Invalid token",
            JwtError::EncodingFailure(_) => "Internal error",
        }
    }

    /// Whether the client should log in again rather than retry.
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::Expired)
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            // A header naming any algorithm other than the pinned one is
            // treated as a forgery.
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::MalformedToken(error.to_string()),
        }
    }
}
