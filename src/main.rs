//! Clinic front-desk service
//!
//! Main entry point: loads configuration, connects the store, and serves
//! the HTTP API.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use tracing::info;

use frontdesk::api::{self, AppState};
use frontdesk::config;
use frontdesk::store::ClinicStore;

#[derive(Debug, Parser)]
#[command(name = "frontdesk", about = "Clinic front-desk appointment and billing service")]
struct Args {
    /// Bind address override
    #[arg(long)]
    host: Option<String>,

    /// Port override
    #[arg(long)]
    port: Option<u16>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = config::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let store = ClinicStore::connect(&config.database.url, config.cache.redis_url.as_deref()).await?;
    let state = web::Data::new(AppState {
        store: Arc::new(store),
    });

    info!(
        host = %config.server.host,
        port = config.server.port,
        "starting front-desk service"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(api::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
