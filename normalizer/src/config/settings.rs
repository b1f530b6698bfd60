use std::env;
use std::fmt;
use std::str::FromStr;

use normalizer_shared::types::OwnerTable;
use sqlx::postgres::PgConnectOptions;

use crate::errors::ConfigError;

/// Surrogate identifier added to the owner table.
pub const OWNER_ID_COLUMN: &str = "company_id";

/// Connection and table settings for one migration run.
#[derive(Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub owner_table: String,
    pub staging_table: String,
    pub max_connections: u32,
}

impl fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("owner_table", &self.owner_table)
            .field("staging_table", &self.staging_table)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &'static str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

impl MigrationConfig {
    /// Reads the configuration from the process environment.
    ///
    /// `DB_USER`, `DB_PASSWORD` and `DB_NAME` are required; everything else
    /// has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional("DB_HOST", "localhost"),
            port: parsed("DB_PORT", 5432)?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            database: required("DB_NAME")?,
            owner_table: optional("OWNER_TABLE", "company"),
            staging_table: optional("STAGING_TABLE", "company_raw"),
            max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    pub fn owner(&self) -> OwnerTable {
        OwnerTable::new(self.owner_table.as_str(), OWNER_ID_COLUMN).with_staging(self.staging_table.as_str())
    }
}
