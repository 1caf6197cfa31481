//! Greenstall CLI - Token management tools.
//!
//! # Usage
//!
//! ```bash
//! # Mint an access token for a caller
//! gs-cli token issue --subject 6f9b...e2 --kind access
//!
//! # Mint a refresh token with a custom lifetime
//! gs-cli token issue --subject 6f9b...e2 --kind refresh --ttl-minutes 120
//!
//! # Decode and verify a token
//! gs-cli token inspect <token>
//! ```
//!
//! Configuration (the signing secret in particular) is read from the
//! environment; see `greenstall_graph::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "gs-cli")]
#[command(author, version, about = "Greenstall CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue and inspect signed tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Mint a new token
    Issue {
        /// Caller identifier the token is minted for
        #[arg(short, long)]
        subject: String,

        /// Token kind
        #[arg(short, long, value_enum, default_value_t = TokenKind::Access)]
        kind: TokenKind,

        /// Override the configured lifetime
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
    /// Decode and verify an existing token
    Inspect {
        /// The compact token string
        token: String,
    },
}

/// Token kind selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TokenKind {
    Access,
    Refresh,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Token { action } => match action {
            TokenAction::Issue {
                subject,
                kind,
                ttl_minutes,
            } => commands::token::issue(&subject, kind.into(), ttl_minutes)?,
            TokenAction::Inspect { token } => commands::token::inspect(&token)?,
        },
    }
    Ok(())
}

impl From<TokenKind> for greenstall_graph::TokenType {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Access => Self::Access,
            TokenKind::Refresh => Self::Refresh,
        }
    }
}
