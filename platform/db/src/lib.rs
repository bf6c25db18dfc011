//! Database primitives: connection settings, the shared pool and employee storage.

use std::{fmt, time::Duration};

use sea_orm::{DatabaseConnection, DbErr, SqlxPostgresConnector};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;
use url::Url;

pub mod employees;

pub use employees::{EmployeeStore, NewEmployee, SeaOrmEmployees};

/// Shared Postgres pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("invalid connection options: {0}")]
    Options(#[from] sqlx::Error),
    #[error(transparent)]
    Query(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// Connection settings read from `DB_*` environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    /// `require` asks for TLS but skips certificate validation.
    pub ssl_mode: String,
    pub max_connections: u32,
    /// How long a request waits for a pooled connection, retries included.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            user: "postgres".into(),
            password: "postgres".into(),
            database: "employeesdb".into(),
            port: 5432,
            ssl_mode: "require".into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl DatabaseSettings {
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults
    /// for absent or empty values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let port = match get("DB_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| DbError::InvalidSetting {
                key: "DB_PORT",
                reason: format!("{raw:?} is not a port number"),
            })?,
            None => defaults.port,
        };
        let max_connections = match get("DB_POOL_MAX") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(DbError::InvalidSetting {
                        key: "DB_POOL_MAX",
                        reason: format!("{raw:?} is not a positive integer"),
                    });
                }
            },
            None => defaults.max_connections,
        };
        let acquire_timeout = match get("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(DbError::InvalidSetting {
                        key: "DB_ACQUIRE_TIMEOUT_SECS",
                        reason: format!("{raw:?} is not a positive number of seconds"),
                    });
                }
            },
            None => defaults.acquire_timeout,
        };
        let ssl_mode = match get("DB_SSLMODE") {
            Some(raw) => {
                let mode = raw.trim().to_ascii_lowercase();
                if !SSL_MODES.contains(&mode.as_str()) {
                    return Err(DbError::InvalidSetting {
                        key: "DB_SSLMODE",
                        reason: format!("unsupported mode {raw:?}"),
                    });
                }
                mode
            }
            None => defaults.ssl_mode,
        };

        Ok(Self {
            host: get("DB_HOST").unwrap_or(defaults.host),
            user: get("DB_USER").unwrap_or(defaults.user),
            password: get("DB_PASSWORD").unwrap_or(defaults.password),
            database: get("DB_NAME").unwrap_or(defaults.database),
            port,
            ssl_mode,
            max_connections,
            acquire_timeout,
        })
    }

    /// Renders a `postgres://` URL with credentials percent-encoded.
    pub fn database_url(&self) -> DbResult<String> {
        let invalid = |key: &'static str, reason: &str| DbError::InvalidSetting {
            key,
            reason: reason.to_string(),
        };
        let mut url = Url::parse(&format!("postgres://{}", self.host))
            .map_err(|err| invalid("DB_HOST", &err.to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| invalid("DB_USER", "cannot be encoded in a URL"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| invalid("DB_PASSWORD", "cannot be encoded in a URL"))?;
        url.set_port(Some(self.port))
            .map_err(|_| invalid("DB_PORT", "cannot be encoded in a URL"))?;
        url.set_path(&format!("/{}", self.database));
        url.query_pairs_mut().append_pair("sslmode", &self.ssl_mode);
        Ok(url.to_string())
    }
}

/// Creates the shared pool without touching the network. Connections are
/// opened on first use, so an unreachable database surfaces per request.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let options: PgConnectOptions = settings.database_url()?.parse()?;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options);
    Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
}

/// Round-trips a trivial statement through the pool.
pub async fn ping(pool: &DbPool) -> DbResult<()> {
    pool.ping().await.map_err(Into::into)
}
