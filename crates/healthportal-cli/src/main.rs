//! healthportal - HealthPortal command line client
//!
//! Signs in against the portal backend and works with articles, medicines,
//! reviews and support tickets. The session is stored on disk and shared by
//! every `healthportal` process pointed at the same storage directory.
//!
//! # Examples
//!
//! ```bash
//! # Sign in (prompts for password and the emailed code)
//! healthportal login --email ada@example.com
//!
//! # Search medicines
//! healthportal medicines --search aspirin
//!
//! # Follow sign-ins and sign-outs made by other processes
//! healthportal watch
//! ```

mod admin;
mod admin_commands;
mod auth;
mod cli;
mod commands;
mod content;
mod context;
mod prompt;
mod review_commands;
mod ticket_commands;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use healthportal_core::ApiError;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{cli::Cli, commands::Commands, context::Context};

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered log lines when dropped.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", ApiError::describe(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context::open(&cli)?;
    info!(api_url = ctx.api.base_url(), "healthportal starting");

    match cli.command {
        // Authentication
        Commands::Signup => auth::signup(&mut ctx).await,
        Commands::VerifySignup { email } => auth::verify_signup(&mut ctx, &email).await,
        Commands::Login { email, admin } => auth::login(&mut ctx, email, admin).await,
        Commands::Google { access_token } => auth::google(&mut ctx, &access_token).await,
        Commands::ForgotPassword { email } => auth::forgot_password(&mut ctx, email).await,
        Commands::Logout => {
            auth::logout(&ctx);
            Ok(())
        }
        Commands::Whoami { remote } => auth::whoami(&ctx, remote).await,
        Commands::Watch => auth::watch(&ctx).await,

        // Content
        Commands::Articles {
            category,
            limit,
            search,
            categories,
        } => {
            content::articles(
                &ctx,
                category.as_deref(),
                limit,
                search.as_deref(),
                categories,
            )
            .await
        }
        Commands::Article { id } => content::article(&ctx, &id).await,
        Commands::Medicines { search } => content::medicines(&ctx, search.as_deref()).await,
        Commands::Reviews { action } => content::reviews(&ctx, action).await,
        Commands::Tickets { action } => content::tickets(&ctx, action).await,

        // Admin
        Commands::Admin { action } => admin::run(&ctx, action).await,
    }
}
