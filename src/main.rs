mod config;
mod context;
mod domain;
mod error;
mod http;
mod infra;
mod services;
#[cfg(test)]
mod testutil;
mod workflow;

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::directory::HttpUserDirectory;
use crate::infra::sqlite::{self, SqliteTicketStore};

#[derive(Parser)]
#[command(name = "ticketd", author, version, about = "Ticket-tracking backend")]
struct Cli {
    /// Address to listen on; overrides TICKETD_LISTEN_ADDR.
    #[arg(long)]
    listen: Option<String>,
    /// SQLite database path; overrides TICKETD_DATABASE_PATH.
    #[arg(long)]
    database: Option<String>,
    /// User directory base URL; overrides TICKETD_DIRECTORY_URL.
    #[arg(long)]
    directory_url: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(url) = cli.directory_url {
        config.directory_base_url = url;
    }

    let pool = sqlite::connect(&config.database_path).await?;
    sqlite::migrate(&pool).await?;

    let store = Arc::new(SqliteTicketStore::new(pool));
    let directory = Arc::new(HttpUserDirectory::new(
        config.directory_base_url.clone(),
        config.directory_timeout,
    )?);

    let context = AppContext::new(config.clone(), store, directory);
    let router = http::build_router(context);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, directory = %config.directory_base_url, "ticketd listening");
    axum::serve(listener, router).await?;

    Ok(())
}
