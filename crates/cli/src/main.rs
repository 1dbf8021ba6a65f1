//! Aora CLI - Account and feed tools against a live Appwrite project.
//!
//! # Usage
//!
//! ```bash
//! # Register an account, sign it in, and create its profile
//! AORA_PASSWORD=Secret123 aora sign-up -e a@example.com -u alice
//!
//! # Sign in and show the current user
//! AORA_PASSWORD=Secret123 aora whoami -e a@example.com
//!
//! # Create the missing profile for an account whose sign-up stopped halfway
//! AORA_PASSWORD=Secret123 aora resume -e a@example.com
//!
//! # List the newest videos
//! aora trending -l 5
//! ```
//!
//! # Environment Variables
//!
//! - `AORA_*` - Backend configuration (see `aora_backend::config`)
//! - `AORA_PASSWORD` - Password for commands that sign in, instead of `-p`
//! - `RUST_LOG` - Log filter (default: `aora_backend=info,aora_cli=info`)
//! - `AORA_LOG_FORMAT` - Set to `json` for JSON log lines
//!
//! Results are printed to stdout as JSON; logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aora_backend::{Backend, BackendConfig};

mod commands;

#[derive(Parser)]
#[command(name = "aora")]
#[command(author, version, about = "Aora backend tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an account, sign it in, and create its profile
    SignUp {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prefer the environment over argv)
        #[arg(short, long, env = "AORA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display username
        #[arg(short, long)]
        username: String,
    },
    /// Sign in and print the session
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prefer the environment over argv)
        #[arg(short, long, env = "AORA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the current user, signing in first when credentials are given
    Whoami {
        /// Email address
        #[arg(short, long, requires = "password")]
        email: Option<String>,

        /// Password, used only together with --email
        #[arg(short, long, env = "AORA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign in and create the profile record if it is missing
    Resume {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prefer the environment over argv)
        #[arg(short, long, env = "AORA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List the newest video posts
    Trending {
        /// Number of posts to show (1-100)
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aora_backend=info,aora_cli=info".into());

    let json = std::env::var("AORA_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = BackendConfig::from_env()?;
    let backend = Backend::new(config)?;

    match cli.command {
        Commands::SignUp {
            email,
            password,
            username,
        } => commands::account::sign_up(&backend, &email, password, &username).await?,
        Commands::SignIn { email, password } => {
            commands::account::sign_in(&backend, &email, password).await?;
        }
        Commands::Whoami { email, password } => {
            let credentials = email.zip(password);
            commands::account::whoami(&backend, credentials).await?;
        }
        Commands::Resume { email, password } => {
            commands::account::resume(&backend, &email, password).await?;
        }
        Commands::Trending { limit } => commands::trending::latest(&backend, limit).await?,
    }
    Ok(())
}
