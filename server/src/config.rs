use anyhow::{Context, Result};

use crate::allocator::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./tinylink.db"
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when generating short links, e.g. "https://go.example.com"
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// Upper bound on generate-and-insert attempts for random codes.
    pub code_max_attempts: u32,

    /// Size of the SQLite connection pool
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let code_max_attempts = match lookup("CODE_MAX_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .context("CODE_MAX_ATTEMPTS must be a positive integer")?,
            None => DEFAULT_MAX_ATTEMPTS,
        };
        if code_max_attempts == 0 {
            anyhow::bail!("CODE_MAX_ATTEMPTS must be at least 1");
        }

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            None => 10,
        };
        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:./tinylink.db".into()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            code_max_attempts,
            db_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite:./tinylink.db");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.code_max_attempts, 10);
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = load(&[("BASE_URL", "https://go.example.com/"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.base_url, "https://go.example.com");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load(&[("PORT", "99999")]).is_err());
        assert!(load(&[("CODE_MAX_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("CODE_MAX_ATTEMPTS", "many")]).is_err());
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
    }
}
