use thiserror::Error;

/// Authorization header parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Invalid Authorization header format. Expected: Bearer <token>")]
    InvalidScheme,

    #[error("Authorization header carries no token")]
    Empty,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme name is matched case-insensitively.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, BearerError> {
    let header = header.ok_or(BearerError::Missing)?.trim();

    let (scheme, token) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::InvalidScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Empty);
    }

    Ok(token)
}
