//! Server configuration from the environment.

use std::fmt::Debug;
use std::str::FromStr;

use sonora_core::batching::BatchConfig;

use crate::auth::tokens::JwtConfig;

/// Default cap on a multipart CSV import body (20 MiB).
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 20 * 1024 * 1024;

/// Parse `name` from the environment, or fall back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse. Only called at
/// startup.
pub(crate) fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e:?}")),
        _ => default,
    }
}

/// Where contract extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// FIFO queue inside the API process.
    Inline,
    /// `sonora-worker` polls the database.
    External,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "external" => Ok(Self::External),
            other => Err(format!("expected 'inline' or 'external', got '{other}'")),
        }
    }
}

/// Everything the API server reads at startup.
///
/// | Env var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `HOST`                  | `0.0.0.0`               |
/// | `PORT`                  | `3000`                  |
/// | `CORS_ORIGINS`          | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
/// | `MAX_IMPORT_BYTES`      | `20971520`              |
/// | `EXTRACTION_MODE`       | `inline`                |
///
/// plus [`JwtConfig::from_env`] and [`BatchConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Budget for draining the extraction queue on shutdown.
    pub shutdown_timeout_secs: u64,
    pub max_import_bytes: usize,
    pub extraction_mode: ExtractionMode,
    pub jwt: JwtConfig,
    pub batch: BatchConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            max_import_bytes: env_or("MAX_IMPORT_BYTES", DEFAULT_MAX_IMPORT_BYTES),
            extraction_mode: env_or("EXTRACTION_MODE", ExtractionMode::Inline),
            jwt: JwtConfig::from_env(),
            batch: BatchConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
