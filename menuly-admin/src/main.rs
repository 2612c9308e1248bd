//! # Menuly Admin
//!
//! Operational tooling for a Menuly deployment: creating accounts, seeding
//! demo users, checking configuration and rotating secrets.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p menuly-admin -- verify-env
//! cargo run -p menuly-admin -- create-user
//! cargo run -p menuly-admin -- create-test-users --domain menuly.test
//! cargo run -p menuly-admin -- update-token .env.local
//! ```

mod commands;

use clap::{Parser, Subcommand};
use commands::{create_user, test_users, update_token, verify_env, Prompt};
use menuly_shared::baas::{BaasConfig, ClientContext, SupabaseClient};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Menuly admin CLI
#[derive(Parser, Debug)]
#[command(name = "menuly-admin")]
#[command(version, about = "Operational tooling for Menuly", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user interactively
    CreateUser,

    /// Create one owner and two staff demo accounts
    CreateTestUsers {
        /// Email domain for the demo accounts
        #[arg(long, default_value = test_users::DEFAULT_DOMAIN)]
        domain: String,
    },

    /// Check environment variables and backend connectivity
    VerifyEnv,

    /// Set a variable in an env file
    UpdateToken {
        /// Env file to update
        #[arg(default_value = update_token::DEFAULT_ENV_FILE)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menuly_admin=info,menuly_shared=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut prompt = Prompt::new(std::io::stdin().lock(), std::io::stdout());

    match cli.command {
        Command::CreateUser => {
            let baas = server_client()?;
            create_user::run(&baas, &mut prompt).await?;
        }
        Command::CreateTestUsers { domain } => {
            let baas = server_client()?;
            let credentials = test_users::run(&baas, &domain).await?;
            prompt.say("Created test users:")?;
            prompt.say(test_users::format_credentials(&credentials))?;
        }
        Command::VerifyEnv => {
            let checks = verify_env::run().await;
            for check in &checks {
                prompt.say(check)?;
            }

            let failures = checks.iter().filter(|c| c.failed()).count();
            if failures > 0 {
                anyhow::bail!("{} check(s) failed", failures);
            }
            prompt.say("Environment OK")?;
        }
        Command::UpdateToken { file } => {
            update_token::run(&file, &mut prompt)?;
        }
    }

    Ok(())
}

/// Service-role client from the environment
fn server_client() -> anyhow::Result<SupabaseClient> {
    let config = BaasConfig::from_env()?;
    Ok(SupabaseClient::for_context(&config, ClientContext::Server)?)
}
