// Application configuration
// Settings come from `secrets-store/<NAME>` files first, then the environment

use regex::Regex;
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::validation::coerce_flag;

const DEFAULT_SECRETS_DIR: &str = "secrets-store";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No database configured, set DATABASE_URL, POSTGRES_CONNECTION_STRING or STORAGE_BACKEND=memory")]
    MissingDatabase,

    #[error("Invalid configuration value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    #[error("{0} is not supported by this build")]
    UnsupportedBackend(&'static str),
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name,
            message: message.into(),
        }
    }
}

/// Connection parts taken from a `key=value;` connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Url(String),
    Parts(PostgresSettings),
}

impl DatabaseTarget {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match self {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|e| ConfigError::invalid("DATABASE_URL", e.to_string())),
            DatabaseTarget::Parts(parts) => Ok(PgConnectOptions::new()
                .host(&parts.host)
                .port(parts.port)
                .username(&parts.user)
                .password(&parts.password)
                .database(&parts.database)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres(DatabaseTarget),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Reads the configuration from secrets files and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let secrets_dir = std::env::var("SECRETS_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_DIR));
        Self::from_lookup(|name| read_setting(&secrets_dir, name))
    }

    /// Builds the configuration from any name to value lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::invalid("PORT", e.to_string()))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::invalid("DATABASE_MAX_CONNECTIONS", e.to_string()))?;

        let run_migrations = lookup("RUN_MIGRATIONS")
            .map(|v| coerce_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            host,
            port,
            backend: select_backend(&lookup)?,
            max_connections,
            run_migrations,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn select_backend<F>(lookup: &F) -> Result<StorageBackend, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(backend) = lookup("STORAGE_BACKEND") {
        match backend.trim().to_lowercase().as_str() {
            "memory" => return Ok(StorageBackend::Memory),
            "postgres" | "" => {}
            other => {
                return Err(ConfigError::invalid(
                    "STORAGE_BACKEND",
                    format!("unknown backend '{}'", other),
                ))
            }
        }
    }

    if lookup("MSSQL_CONNECTION_STRING").is_some() {
        return Err(ConfigError::UnsupportedBackend("MSSQL_CONNECTION_STRING"));
    }
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(StorageBackend::Postgres(DatabaseTarget::Url(url)));
    }
    if let Some(connection_string) = lookup("POSTGRES_CONNECTION_STRING") {
        let settings = parse_connection_string(&connection_string)?;
        return Ok(StorageBackend::Postgres(DatabaseTarget::Parts(settings)));
    }

    Err(ConfigError::MissingDatabase)
}

/// A setting's value, trimmed; empty values count as unset
fn read_setting(secrets_dir: &Path, name: &str) -> Option<String> {
    let name = name.trim().to_uppercase();
    let value = match std::fs::read_to_string(secrets_dir.join(&name)) {
        Ok(contents) => contents,
        Err(_) => std::env::var(&name).ok()?,
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Splits on `;` unless escaped as `\;`
fn split_escaped(input: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&';') => {
                chars.next();
                if let Some(part) = parts.last_mut() {
                    part.push(';');
                }
            }
            ';' => parts.push(String::new()),
            c => {
                if let Some(part) = parts.last_mut() {
                    part.push(c);
                }
            }
        }
    }
    parts
}

/// Parses `host=..;port=..;user=..;password=..;database=..`
///
/// Keys are case-insensitive, unknown keys and malformed parts are ignored,
/// and a port that is not all digits counts as missing.
pub fn parse_connection_string(input: &str) -> Result<PostgresSettings, ConfigError> {
    const NAME: &str = "POSTGRES_CONNECTION_STRING";
    let digits = Regex::new(r"^\d+$").map_err(|e| ConfigError::invalid(NAME, e.to_string()))?;

    let (mut host, mut port, mut user, mut password, mut database) = (None, None, None, None, None);

    for part in split_escaped(input) {
        let pieces: Vec<&str> = part.split('=').collect();
        let [key, value] = pieces.as_slice() else {
            continue;
        };
        let value = value.to_string();
        match key.trim().to_lowercase().as_str() {
            "host" => host = Some(value),
            "port" if digits.is_match(&value) => port = Some(value),
            "user" => user = Some(value),
            "password" => password = Some(value),
            "database" => database = Some(value),
            other => tracing::debug!("Ignoring connection string key {}", other),
        }
    }

    let (Some(host), Some(port), Some(user), Some(password), Some(database)) =
        (host, port, user, password, database)
    else {
        return Err(ConfigError::invalid(
            NAME,
            "missing required parameters (host, port, user, password, database)",
        ));
    };

    let port = port
        .parse::<u16>()
        .map_err(|e| ConfigError::invalid(NAME, format!("port: {}", e)))?;

    Ok(PostgresSettings {
        host,
        port,
        user,
        password,
        database,
    })
}
