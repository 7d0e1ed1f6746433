//! SSO Server
//!
//! gRPC identity service: registration, login, token rotation, email
//! confirmation, password recovery and user profiles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tonic::transport::Server;
use tracing::{info, warn};

use sso_core::RequestContext;
use sso_core::config::load_config;
use sso_core::tracing_init::init_tracing;
use sso_proto::v1::auth_service_server::AuthServiceServer;
use sso_proto::v1::users_service_server::UsersServiceServer;

use sso_server::auth::JwtManager;
use sso_server::notifications::{Notifier, publisher_from_config};
use sso_server::server::{AuthServiceImpl, UsersServiceImpl};
use sso_server::storage::{Database, PoolSettings};
use sso_server::usecases::UseCases;
use sso_server::validation::Validator;

#[derive(Parser, Debug)]
#[command(name = "sso-server")]
#[command(version, about = "SSO identity server - users, tokens and profiles over gRPC")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, env = "SSO_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the path to the SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Override the log level (e.g. `debug`, `sso_server=trace`).
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.transport.host = host;
    }
    if let Some(port) = args.port {
        config.transport.port = port;
    }
    if let Some(path) = args.db_path {
        config.database.path = Some(path);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.log_json {
        config.logging.json = true;
    }
    config.validate()?;

    init_tracing(
        &config.logging.level,
        config.logging.json,
        config.logging.file_path.as_deref(),
    )?;

    let addr = config.transport.addr()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        "Starting sso-server"
    );

    let db_path = config
        .database_path()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine database path"))?;
    info!(path = %db_path.display(), "Opening SSO database");
    let db = Arc::new(Database::open(&db_path, PoolSettings::from(&config.database)).await?);

    let jwt = Arc::new(JwtManager::from_config(&config.security.jwt)?);
    let validator = Validator::new(&config.validation)?;
    let publisher = publisher_from_config(&config.notifications)?;
    let notifier = Notifier::new(publisher, config.notifications.subjects.clone());

    let usecases = Arc::new(UseCases::new(
        db.clone(),
        db,
        jwt,
        validator,
        notifier,
        config.security.hash_cost,
    ));

    let auth = AuthServiceImpl::new(Arc::clone(&usecases));
    let users = UsersServiceImpl::new(Arc::clone(&usecases));

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthServiceImpl>>()
        .await;
    health_reporter
        .set_serving::<UsersServiceServer<UsersServiceImpl>>()
        .await;

    // Purge expired refresh tokens in the background
    let gc_usecases = Arc::clone(&usecases);
    let gc_interval = Duration::from_secs(config.database.token_gc_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(gc_interval);
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            let ctx = RequestContext::background();
            match gc_usecases.purge_expired_refresh_tokens(&ctx).await {
                Ok(removed) if removed > 0 => {
                    info!(removed, "Expired refresh tokens purged");
                }
                Err(e) => {
                    warn!(error = %e, "Refresh token purge failed");
                }
                _ => {}
            }
        }
    });

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    #[cfg(unix)]
    let sigterm_future = sigterm.recv();
    #[cfg(not(unix))]
    let sigterm_future = std::future::pending::<Option<()>>();

    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C shutdown signal");
            }
            _ = sigterm_future => {
                info!("Received SIGTERM shutdown signal");
            }
        }
    };

    let grpc_router = Server::builder()
        .http2_keepalive_interval(Some(Duration::from_secs(30)))
        .http2_keepalive_timeout(Some(Duration::from_secs(10)))
        .add_service(health_service)
        .add_service(AuthServiceServer::new(auth))
        .add_service(UsersServiceServer::new(users));

    #[cfg(unix)]
    sd_notify::notify(true, &[sd_notify::NotifyState::Ready])?;

    info!(addr = %addr, "gRPC server ready");
    grpc_router.serve_with_shutdown(addr, shutdown).await?;

    info!("SSO server stopped");
    Ok(())
}
