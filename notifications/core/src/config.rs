use std::{fmt::Debug, net::SocketAddr};

use sqlx::postgres::PgSslMode;

/// Scopes every platform user holds; notifying one of them would reach
/// effectively everyone.
pub const DEFAULT_UAA_SCOPES: [&str; 10] = [
    "cloud_controller.read",
    "cloud_controller.write",
    "openid",
    "approvals.me",
    "cloud_controller_service_permissions.read",
    "scim.me",
    "uaa.user",
    "password.write",
    "scim.userids",
    "oauth.approvals",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub web: WebConfig,

    pub postgres: PostgresConfig,

    pub uaa: UaaConfig,

    pub cloud_controller: CloudControllerConfig,

    pub default_scopes: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub listen_address: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct UaaConfig {
    pub host: String,
    pub client_id: String,
    pub client_secret: String,
    pub verify_ssl: bool,
}

#[derive(Clone, Debug)]
pub struct CloudControllerConfig {
    pub url: String,
    pub verify_ssl: bool,
}

#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub host: String,

    pub port: u16,

    pub database: String,

    pub username: String,

    pub password: String,

    pub role: Option<String>,

    pub ssl_mode: PgSslMode,

    pub max_connections: u32,

    pub application_name: Option<String>,
}
