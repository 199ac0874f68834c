use std::io::BufRead;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use payit_auth::Authenticator;
use payit_auth::Claims;
use payit_auth::CredentialRecord;
use serde_json::Value;

/// Read one line from stdin without its line terminator.
fn read_password() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Format timestamp as human-readable UTC string
fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Invalid timestamp".to_string(),
    }
}

/// Parse a `key=value` claim. Integers and booleans keep their type.
pub(crate) fn parse_claim(claim: &str) -> Result<(String, Value)> {
    let Some((key, value)) = claim.split_once('=') else {
        anyhow::bail!("Invalid claim format '{claim}'. Expected format: key=value");
    };

    if key.is_empty() {
        anyhow::bail!("Invalid claim format '{claim}'. Claim name is empty");
    }

    let value = if let Ok(number) = value.parse::<i64>() {
        Value::from(number)
    } else if let Ok(flag) = value.parse::<bool>() {
        Value::Bool(flag)
    } else {
        Value::String(value.to_string())
    };

    Ok((key.to_string(), value))
}

pub fn hash_password(authenticator: &Authenticator) -> Result<ExitCode> {
    let password = read_password()?;
    if password.is_empty() {
        anyhow::bail!("Refusing to hash an empty password");
    }

    let record = authenticator.hash_password(&password)?;
    println!("{}", record.as_str());

    Ok(ExitCode::SUCCESS)
}

pub fn verify_password(authenticator: &Authenticator, record: String) -> Result<ExitCode> {
    let password = read_password()?;
    let record = CredentialRecord::new(record);

    if authenticator.password_hasher().verify(&password, &record) {
        println!("valid");
        if authenticator.password_hasher().needs_rehash(&record) {
            eprintln!("note: record uses an outdated scheme or cost");
        }
        Ok(ExitCode::SUCCESS)
    } else {
        println!("invalid");
        Ok(ExitCode::FAILURE)
    }
}

pub fn issue_token(
    authenticator: &Authenticator,
    subject: String,
    claim_strings: Vec<String>,
    ttl_minutes: Option<i64>,
) -> Result<ExitCode> {
    let mut claims = Claims::new().with_subject(subject);
    for claim in &claim_strings {
        let (key, value) = parse_claim(claim)?;
        claims = claims.with_extra(key, value);
    }

    let issued = authenticator
        .token_codec()
        .issue_token(claims, ttl_minutes.map(Duration::minutes))?;

    eprintln!("expires: {}", format_timestamp(issued.expires_at));
    println!("{}", issued.token);

    Ok(ExitCode::SUCCESS)
}

pub fn verify_token(authenticator: &Authenticator, token: &str) -> Result<ExitCode> {
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    match authenticator.validate_token(token) {
        Ok(claims) => {
            println!("{}", serde_json::to_string_pretty(&claims)?);
            if let Some(exp) = claims.exp {
                eprintln!("expires: {}", format_timestamp(exp));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("rejected: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Decode the header and payload segments without checking the signature.
pub(crate) fn decode_segments(token: &str) -> Result<(Value, Value)> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        anyhow::bail!(
            "Invalid token format - expected 3 parts separated by dots, got {} parts",
            parts.len()
        );
    }

    let decode_part = |name: &str, part: &str| -> Result<Value> {
        let bytes = URL_SAFE_NO_PAD
            .decode(part.trim_end_matches('='))
            .with_context(|| format!("Failed to decode token {name}"))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse token {name}"))
    };

    Ok((decode_part("header", parts[0])?, decode_part("payload", parts[1])?))
}

/// Print a token's header and payload for inspection.
///
/// Nothing is verified; use `verify-token` to decide whether to trust it.
pub fn decode_token(token: &str) -> Result<ExitCode> {
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    let (header, payload) = decode_segments(token)?;

    eprintln!("WARNING: signature NOT verified");
    println!("Header:");
    println!("{}", serde_json::to_string_pretty(&header)?);
    println!("Payload:");
    println!("{}", serde_json::to_string_pretty(&payload)?);

    match payload.get("exp").and_then(Value::as_i64) {
        Some(exp) => eprintln!("expires: {}", format_timestamp(exp)),
        None => eprintln!("expires: no numeric 'exp' claim"),
    }

    Ok(ExitCode::SUCCESS)
}
