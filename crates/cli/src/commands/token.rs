//! Token issue/inspect commands.

use chrono::{DateTime, Utc};
use thiserror::Error;

use greenstall_graph::{Claims, GraphConfig, TokenError, TokenManager, TokenType};

/// Errors surfaced by the token commands.
#[derive(Debug, Error)]
pub enum TokenCommandError {
    #[error("configuration error: {0}")]
    Config(#[from] greenstall_graph::ConfigError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

/// Mint a token and print it to stdout.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the token cannot
/// be issued.
#[allow(clippy::print_stdout)]
pub fn issue(
    subject: &str,
    kind: TokenType,
    ttl_minutes: Option<i64>,
) -> Result<(), TokenCommandError> {
    let config = GraphConfig::from_env()?;
    let tokens = TokenManager::new(config.signing_secret.clone(), config.tokens.clone());

    let ttl = ttl_minutes.map_or(
        match kind {
            TokenType::Access => config.tokens.access_ttl,
            TokenType::Refresh => config.tokens.refresh_ttl,
        },
        chrono::Duration::minutes,
    );

    let token = tokens.issue(subject, serde_json::Map::new(), ttl, kind)?;

    tracing::info!(
        subject,
        kind = kind.as_str(),
        ttl_minutes = ttl.num_minutes(),
        "token issued"
    );
    println!("{token}");
    Ok(())
}

/// Verify a token and print its claims as pretty JSON.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the token fails
/// verification (bad structure, bad signature, expired).
#[allow(clippy::print_stdout)]
pub fn inspect(token: &str) -> Result<(), TokenCommandError> {
    let config = GraphConfig::from_env()?;
    let tokens = TokenManager::new(config.signing_secret.clone(), config.tokens.clone());

    let claims = tokens.verify(token)?;
    println!("{}", render_claims(&claims));
    Ok(())
}

/// Human-oriented rendering of verified claims.
fn render_claims(claims: &Claims) -> String {
    let expires = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .map_or_else(|| claims.exp.to_string(), |at| at.to_rfc3339());

    let mut out = format!(
        "subject:    {}\ntoken_type: {}\nexpires:    {expires}",
        claims.sub,
        claims.token_type.as_str(),
    );
    if !claims.extra.is_empty() {
        let extra = serde_json::to_string_pretty(&claims.extra)
            .unwrap_or_else(|_| "<unprintable>".to_owned());
        out.push_str("\nextra:      ");
        out.push_str(&extra);
    }
    out
}
