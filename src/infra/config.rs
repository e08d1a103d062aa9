//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "./storage/app/public";
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2048 * 1024;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_OWNER_HEADER: &str = "x-owner-id";
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("expected `postgres` or `memory`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Required when `storage_backend` is Postgres.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_image_bytes: usize,
    /// Header carrying the authenticated owner id, lowercase.
    pub owner_header: String,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = parse_or(&var, "STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = var("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!(
                "DATABASE_URL must be set when STORAGE_BACKEND=postgres"
            ));
        }

        let db_max_connections =
            parse_or(&var, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?.max(1);
        let bind_addr: SocketAddr = match var("BIND_ADDR") {
            Some(v) => v
                .parse()
                .with_context(|| format!("BIND_ADDR is not a valid socket address: {}", v))?,
            None => DEFAULT_BIND_ADDR.parse()?,
        };

        let upload_dir = var("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());
        let upload_dir = PathBuf::from(shellexpand::tilde(&upload_dir).to_string());

        let max_image_bytes = parse_or(&var, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?;
        if max_image_bytes == 0 {
            return Err(anyhow!("MAX_IMAGE_BYTES must be greater than zero"));
        }

        let owner_header = var("OWNER_HEADER")
            .unwrap_or_else(|| DEFAULT_OWNER_HEADER.to_string())
            .trim()
            .to_ascii_lowercase();
        axum::http::HeaderName::from_str(&owner_header)
            .with_context(|| format!("OWNER_HEADER is not a valid header name: {}", owner_header))?;

        Ok(Self {
            storage_backend,
            database_url,
            db_max_connections,
            bind_addr,
            upload_dir,
            max_image_bytes,
            owner_header,
        })
    }

    /// Config for in-process servers: memory store, ephemeral port.
    pub fn for_memory(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            upload_dir: upload_dir.into(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            owner_header: DEFAULT_OWNER_HEADER.to_string(),
        }
    }
}

/// Log filter from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn log_filter() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string())
}

fn parse_or<T, V>(var: &V, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value `{}`: {}", key, raw, e)),
        None => Ok(default),
    }
}
