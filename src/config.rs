use anyhow::{bail, Result};
use serde::Deserialize;
use std::{env, str::FromStr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub image_cap: i64,
    pub retention: RetentionPolicy,
}

/// What happens once an email has reached its image cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Further inserts are rejected.
    #[default]
    Capped,
    /// Inserts are always accepted; only the newest records are surfaced.
    Rolling,
}

impl FromStr for RetentionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capped" => Ok(RetentionPolicy::Capped),
            "rolling" => Ok(RetentionPolicy::Rolling),
            other => bail!("unknown retention policy '{}', expected 'capped' or 'rolling'", other),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let image_cap: i64 = env::var("IMAGE_CAP")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?;
        if image_cap < 1 {
            bail!("IMAGE_CAP must be at least 1, got {}", image_cap);
        }

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://image_quota.db?mode=rwc".to_string()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            image_cap,
            retention: env::var("IMAGE_RETENTION")
                .unwrap_or_else(|_| "capped".to_string())
                .parse()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            port: 8000,
            image_cap: 5,
            retention: RetentionPolicy::Capped,
        }
    }
}
