//! ReqRes users client - fetch users from the ReqRes API
//!
//! Lists users or shows a single user. Results are cached for the configured
//! time-to-live and transient failures are retried.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reqres_users::cli::{Cli, Command};
use reqres_users::data::{RemoteUserSource, UserRecord};
use reqres_users::{ApiFailure, UserQueryService};

/// User fetched by the demo
const DEMO_USER_ID: u32 = 2;

/// Prints a list of users, one per line
fn print_users(users: &[UserRecord]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    for user in users {
        println!("{}", user.summary());
    }
}

/// Reports a failure without stopping the program
fn report(failure: &ApiFailure) {
    eprintln!("{}: {}", failure.kind(), failure);
}

async fn show_all(service: &UserQueryService<RemoteUserSource>) {
    match service.get_all_users().await {
        Ok(users) => print_users(&users),
        Err(failure) => report(&failure),
    }
}

async fn show_user(service: &UserQueryService<RemoteUserSource>, id: u32) {
    match service.get_user(id).await {
        Ok(user) => println!("{}", user.summary()),
        Err(failure) => report(&failure),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Defaults to info for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    info!(
        "Configuration loaded: base_url={}, attempts={}, delay={}ms, ttl={}s",
        settings.api_settings.base_url,
        settings.retry_policy_settings.max_attempts(),
        settings.retry_policy_settings.delay().as_millis(),
        settings.cache_settings.ttl().as_secs()
    );

    let service = match UserQueryService::from_settings(&settings) {
        Ok(service) => service,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    match cli.command() {
        Command::All => show_all(&service).await,
        Command::User { id } => show_user(&service, id).await,
        Command::Demo => {
            println!("Fetching all users...");
            show_all(&service).await;

            println!("\nFetching a single user (ID = {})...", DEMO_USER_ID);
            show_user(&service, DEMO_USER_ID).await;

            println!("\nFetching all users again...");
            show_all(&service).await;
        }
    }

    ExitCode::SUCCESS
}
