use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_core::identity::IdentityDirectory;
use feedback_core::notify::LogNotifier;
use feedback_core::Tracker;
use feedback_tracker::api;
use feedback_tracker::config::{AddrArgs, Cli, Commands, ServeArgs, UsersArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "feedback_tracker=debug,feedback_core=debug,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command() {
        Commands::Serve(args) => serve(args).await,
        Commands::Status(args) => status(args).await,
        Commands::Users(args) => users(args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let db = args.open_database()?;
    let directory = args.users.load_directory()?;
    tracing::info!(users = directory.len(), "Loaded identity directory");

    let tracker = Tracker::new(db, Arc::new(directory), Arc::new(LogNotifier))
        .with_app_url(args.app_url.clone());
    let synced = tracker.sync_directory()?;
    tracing::debug!(synced, "Synced users into the database");

    let app = api::create_router(tracker);

    let addr = args.addr.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Feedback tracker listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn status(args: AddrArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/health", args.base_url());
    println!("Checking feedback tracker at {}...", args.base_url());

    match reqwest::get(&url).await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await?;
            println!(
                "Server is running (database: {})",
                body["database"].as_str().unwrap_or("unknown")
            );
        }
        Ok(response) => println!("Server responded with {}", response.status()),
        Err(err) => println!("Server is not running: {}", err),
    }
    Ok(())
}

fn users(args: UsersArgs) -> anyhow::Result<()> {
    let directory = args.load_directory()?;
    for user in directory.users() {
        let manager = user
            .manager_id
            .map(|id| format!(" (reports to {})", id))
            .unwrap_or_default();
        println!(
            "{:>4}  {:<20} {:<28} {}{}",
            user.id,
            user.name,
            user.email,
            user.role.as_str(),
            manager
        );
    }
    Ok(())
}
