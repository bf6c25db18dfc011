use anyhow::{Context, Result};
use platform_db::DatabaseSettings;

/// Port the HTTP listener binds to.
pub const LISTEN_PORT: u16 = 5000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let database =
            DatabaseSettings::from_lookup(&lookup).context("invalid database configuration")?;

        Ok(Self {
            database,
            cors_allowed_origins,
        })
    }
}
