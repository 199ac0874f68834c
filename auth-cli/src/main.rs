use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use payit_auth::AuthConfig;
use payit_auth::Authenticator;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// Operator tooling for the PayIt authentication core.
///
/// Reads the same configuration as the service: config/default.toml,
/// config/{RUN_MODE}.toml, then JWT__* and PASSWORD__* environment variables.
#[derive(Parser)]
#[command(name = "payit-authctl", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Hash a password read from stdin and print the credential record
    HashPassword,

    /// Check a password read from stdin against a credential record
    ///
    /// Exits with status 1 when the password does not match.
    VerifyPassword {
        /// Stored credential record
        #[arg(long)]
        record: String,
    },

    /// Issue a signed access token
    IssueToken {
        /// Subject claim (user identifier)
        #[arg(long)]
        subject: String,

        /// Custom claim in key=value format (can be specified multiple times)
        #[arg(long)]
        claim: Vec<String>,

        /// Lifetime in minutes, defaults to jwt.expiration_minutes
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },

    /// Verify a token and print its claims
    ///
    /// Exits with status 1 when the token is rejected.
    VerifyToken {
        /// Token string, with or without the "Bearer " prefix
        token: String,
    },

    /// Print a token's header and payload WITHOUT verifying its signature
    DecodeToken {
        /// Token string, with or without the "Bearer " prefix
        token: String,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payit_auth=info,payit_authctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Command::DecodeToken { token } = &cli.command {
        return commands::decode_token(token);
    }

    let config = AuthConfig::load().context("Failed to load configuration")?;
    tracing::debug!(
        algorithm = %config.jwt.algorithm,
        expiration_minutes = config.jwt.expiration_minutes,
        password_scheme = ?config.password.scheme,
        password_cost = config.password.cost,
        "Configuration loaded"
    );

    let authenticator = Authenticator::from_config(&config)?;

    match cli.command {
        Command::HashPassword => commands::hash_password(&authenticator),
        Command::VerifyPassword { record } => commands::verify_password(&authenticator, record),
        Command::IssueToken {
            subject,
            claim,
            ttl_minutes,
        } => commands::issue_token(&authenticator, subject, claim, ttl_minutes),
        Command::VerifyToken { token } => commands::verify_token(&authenticator, &token),
        Command::DecodeToken { token } => commands::decode_token(&token),
    }
}
