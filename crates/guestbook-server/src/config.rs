use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use guestbook_types::Variant;

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub variant: Variant,
    pub route: String,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("GUESTBOOK_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("GUESTBOOK_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("GUESTBOOK_PORT must be a port number")?;
        let data_file: PathBuf = lookup("GUESTBOOK_DATA_FILE")
            .unwrap_or_else(|| "guestbook-data.json".into())
            .into();
        let variant: Variant = lookup("GUESTBOOK_VARIANT")
            .unwrap_or_else(|| "grid".into())
            .parse()
            .map_err(|e: String| anyhow!("GUESTBOOK_VARIANT: {}", e))?;

        let route = lookup("GUESTBOOK_ROUTE").unwrap_or_else(|| "/guestbook".into());
        if !route.starts_with('/') || route == "/health" {
            return Err(anyhow!("GUESTBOOK_ROUTE must start with '/' and not be /health, got '{}'", route));
        }

        let static_dir = lookup("GUESTBOOK_STATIC_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            data_file,
            variant,
            route,
            static_dir,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
