//! Backend entry-point: configuration, migrations, and server startup.

mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::web;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{run_pending_migrations, DbPool, PoolConfig};
use server::{create_server, ServerConfig};

/// Storefront REST backend.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Path to a file holding the JWT signing secret.
    #[arg(
        long,
        env = "JWT_SECRET_FILE",
        default_value = "/var/run/secrets/jwt_secret"
    )]
    jwt_secret_file: PathBuf,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DB_POOL_MAX", default_value_t = 10)]
    db_pool_max: u32,
}

/// Load the JWT signing secret from disk.
///
/// Outside release builds a missing secret file falls back to an ephemeral
/// random secret so local development needs no setup; tokens then become
/// invalid on every restart. Production refuses to start without the file
/// unless `JWT_ALLOW_EPHEMERAL=1` is set explicitly.
fn load_jwt_secret(path: &PathBuf) -> std::io::Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => Ok(bytes),
        Ok(_) => Err(std::io::Error::other(format!(
            "JWT secret file at {} is empty",
            path.display()
        ))),
        Err(e) => {
            let allow_dev = std::env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path.display(), error = %e, "using ephemeral JWT secret (dev only)");
                let mut secret = vec![0u8; 32];
                OsRng.fill_bytes(&mut secret);
                Ok(secret)
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read JWT secret at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let jwt_secret = load_jwt_secret(&cli.jwt_secret_file)?;

    let pool_config = PoolConfig::new(&cli.database_url).with_max_size(cli.db_pool_max);
    let db_pool = DbPool::new(pool_config)
        .await
        .map_err(|e| std::io::Error::other(format!("database pool setup failed: {e}")))?;

    run_pending_migrations(&cli.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(cli.bind_addr, db_pool, jwt_secret);

    info!(bind_addr = %config.bind_addr(), "starting server");
    create_server(health_state, config)?.await
}
