//! Tour API server.
//!
//! # Environment Variables
//!
//! - `CONFIG_PATH`: optional TOML config file
//! - `HOST`, `PORT`, `JWT_SECRET`, `UPLOAD_DIR`, `SITE_LOCALE`, `LOG_FORMAT`: override the file
//! - `ISSUE_TOKEN_FOR`: print a bearer token for this subject at startup
//! - `RUST_LOG`: log filter (default: travel_showcase=info)

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use travel_showcase::config::AppConfig;
use travel_showcase::controller::TourController;
use travel_showcase::http::{create_router, AppState, JwtAuth};
use travel_showcase::logging::init_logger;
use travel_showcase::repository::InMemoryTourRepository;
use travel_showcase::uploads::ImageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::var("CONFIG_PATH").ok().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;
    config.validate()?;

    init_logger(config.logging.format, config.logging.verbose);
    info!("Starting tour server");

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("creating upload directory {}", config.uploads.dir))?;

    let repository = Arc::new(InMemoryTourRepository::new());
    let images = ImageStore::new(&config.uploads.dir, &config.uploads.public_prefix);
    let auth = JwtAuth::from_secret(config.auth.jwt_secret.as_bytes());

    if let Ok(subject) = env::var("ISSUE_TOKEN_FOR") {
        let ttl = chrono::Duration::minutes(config.auth.token_ttl_minutes);
        println!("{}", auth.issue(&subject, ttl)?);
    }

    let state = AppState::new(TourController::new(repository, images), auth);
    let app = create_router(state, &config);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
