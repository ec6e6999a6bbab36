use serde::{Deserialize, Serialize};
use sqlx::postgres::PgSslMode;

/// TLS negotiation with Postgres, spelled as in libpq `sslmode`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => Self::Disable,
            SslMode::Allow => Self::Allow,
            SslMode::Prefer => Self::Prefer,
            SslMode::Require => Self::Require,
            SslMode::VerifyCa => Self::VerifyCa,
            SslMode::VerifyFull => Self::VerifyFull,
        }
    }
}

/// Connection to the database holding message statuses, registrations and
/// the job queue.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,

    pub port: u16,

    pub database: String,

    pub username: String,

    pub password: String,

    /// Role assumed by every pooled connection after connecting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    pub ssl_mode: SslMode,

    pub max_connections: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
}

impl PostgresConfig {
    pub const fn default_port() -> u16 { 5432 }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: Self::default_port(),
            database: "notifications".to_string(),
            username: "notifications".to_string(),
            password: String::new(),
            role: None,
            ssl_mode: SslMode::default(),
            max_connections: 20,
            application_name: Some(notifications_core::PROGRAM_NAME.to_string()),
        }
    }
}

impl From<PostgresConfig> for notifications_core::config::PostgresConfig {
    fn from(config: PostgresConfig) -> Self {
        Self {
            ssl_mode: config.ssl_mode.into(),
            host: config.host,
            port: config.port,
            database: config.database,
            username: config.username,
            password: config.password,
            role: config.role,
            max_connections: config.max_connections,
            application_name: config.application_name,
        }
    }
}
