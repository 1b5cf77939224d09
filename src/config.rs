//! Environment-driven configuration, read once at startup.

use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Static frontend to serve as the router fallback, if the directory exists.
    pub frontend_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a number")?;
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "super-secret-demo-key-change-me".to_string());
        let token_ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "720".to_string())
            .parse()
            .context("TOKEN_TTL_MINUTES must be a number")?;
        let frontend_dir =
            PathBuf::from(std::env::var("FRONTEND_DIR").unwrap_or_else(|_| "frontend".into()));

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            token_ttl_minutes,
            frontend_dir,
        })
    }
}
