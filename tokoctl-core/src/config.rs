//! tokoctl configuration
//!
//! Sources, highest priority first:
//! 1. command-line flags (applied by the caller)
//! 2. `DATABASE_URL` and friends from the environment / `.env` files
//! 3. `./tokoctl.toml`, then `~/.tokoctl/config.toml`
//! 4. built-in defaults

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Kept low for a single storefront process.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 3030;

/// Load environment variables from .env files
///
/// Checks the current directory first, then `~/.tokoctl/.env`. dotenvy never
/// overwrites variables that are already set.
pub fn load_dotenv() {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path.display().to_string());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => loaded_from.push(env_file.display().to_string()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }

    if loaded_from.is_empty() {
        debug!("No .env files found, using process environment only");
    } else {
        info!("Loaded environment from: {}", loaded_from.join(", "));
    }
}

/// Get the tokoctl config directory path (~/.tokoctl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tokoctl"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokoConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; `DATABASE_URL` wins when set
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Allow every CORS origin instead of localhost only
    #[serde(default)]
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_permissive: false,
        }
    }
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

impl TokoConfig {
    /// Load from `./tokoctl.toml` or `~/.tokoctl/config.toml`.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an
    /// error rather than being silently ignored.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("tokoctl.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        match Self::config_path() {
            Some(global) if global.exists() => Self::load_from(&global),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file (invalid TOML): {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get config file path: ~/.tokoctl/config.toml
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Resolve the database URL: explicit override, then `DATABASE_URL`,
    /// then the config file.
    pub fn database_url(&self, override_url: Option<&str>) -> Result<String> {
        override_url
            .map(str::to_owned)
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .or_else(|| self.database.url.clone())
            .context(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, \
                 or [database] url in ~/.tokoctl/config.toml",
            )
    }
}
