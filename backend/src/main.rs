//! Binary entry point: `serve` runs the HTTP server, `add-user` provisions
//! identities (the only way to create administrators).

use std::env;

use actix_web::web;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use octocat_api::auth::hash_password;
use octocat_api::domain::ports::IdentityRepository;
use octocat_api::domain::{Email, NewIdentity};
use octocat_api::inbound::http::health::HealthState;
use octocat_api::outbound::persistence::{
    DbPool, DieselIdentityRepository, PoolConfig, run_migrations,
};
use octocat_api::server::{ServerConfig, create_server};

#[derive(Parser)]
#[command(name = "octocat-api", about = "Octocat catalogue REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Serve,
    /// Provision an identity directly in the store.
    AddUser {
        /// Email address of the new identity.
        email: String,
        /// Plaintext password, hashed before storage.
        #[arg(long)]
        password: String,
        /// Grant the administrator role.
        #[arg(long)]
        admin: bool,
    },
}

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
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::AddUser {
            email,
            password,
            admin,
        } => add_user(&email, &password, admin).await,
    }
}

async fn serve() -> std::io::Result<()> {
    let bind_addr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;
    let jwt_secret = resolve_jwt_secret()?;
    let token_ttl = resolve_token_ttl()?;

    let mut config = ServerConfig::new(bind_addr, jwt_secret, token_ttl);
    if let Ok(url) = env::var("DATABASE_URL") {
        config = config.with_db_pool(connect_database(url).await?);
    } else {
        warn!("DATABASE_URL not set; serving from the in-memory store");
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting server");
    create_server(health_state, config)?.await
}

async fn add_user(email: &str, password: &str, admin: bool) -> std::io::Result<()> {
    let url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("add-user requires DATABASE_URL"))?;
    let email = Email::parse(email).map_err(|e| std::io::Error::other(e.to_string()))?;
    if password.is_empty() {
        return Err(std::io::Error::other("password must not be empty"));
    }
    let password_hash = hash_password(password).map_err(|e| std::io::Error::other(e.to_string()))?;

    let pool = connect_database(url).await?;
    let repository = DieselIdentityRepository::new(pool);
    let stored = repository
        .insert(NewIdentity {
            email,
            password_hash,
            admin,
        })
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(
        email = %stored.identity.email,
        public_id = %stored.identity.public_id,
        admin = stored.identity.admin,
        "identity provisioned"
    );
    Ok(())
}

/// Apply pending migrations, then build the connection pool.
async fn connect_database(url: String) -> std::io::Result<DbPool> {
    let migrate_url = url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migrate_url))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    DbPool::new(PoolConfig::new(url))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))
}

fn resolve_jwt_secret() -> std::io::Result<Vec<u8>> {
    if let Ok(path) = env::var("JWT_SECRET_FILE") {
        return std::fs::read(&path).map_err(|e| {
            std::io::Error::other(format!("failed to read JWT secret at {path}: {e}"))
        });
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        return Ok(secret.into_bytes());
    }
    let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
    if cfg!(debug_assertions) || allow_dev {
        warn!("using ephemeral JWT secret (dev only); tokens will not survive a restart");
        Ok(Uuid::new_v4().into_bytes().to_vec())
    } else {
        Err(std::io::Error::other(
            "JWT_SECRET_FILE or JWT_SECRET must be set",
        ))
    }
}

fn resolve_token_ttl() -> std::io::Result<chrono::Duration> {
    match env::var("TOKEN_TTL_SECS") {
        Ok(raw) => {
            let secs: i64 = raw
                .parse()
                .map_err(|e| std::io::Error::other(format!("invalid TOKEN_TTL_SECS: {e}")))?;
            Ok(chrono::Duration::seconds(secs))
        }
        Err(_) => Ok(chrono::Duration::hours(1)),
    }
}
