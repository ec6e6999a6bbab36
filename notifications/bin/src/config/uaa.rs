use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UaaConfig {
    /// UAA server URL (e.g., <https://uaa.example.com>)
    #[serde(default = "UaaConfig::default_host")]
    pub host: String,

    /// Client used to load client-credentials tokens
    #[serde(default = "UaaConfig::default_client_id")]
    pub client_id: String,

    #[serde(default = "UaaConfig::default_client_secret")]
    pub client_secret: String,

    /// Enable TLS certificate verification
    #[serde(default = "UaaConfig::default_verify_ssl")]
    pub verify_ssl: bool,
}

impl UaaConfig {
    #[inline]
    pub fn default_host() -> String { "http://localhost:8080".to_string() }

    #[inline]
    pub fn default_client_id() -> String { "notifications".to_string() }

    #[inline]
    pub fn default_client_secret() -> String { "changeme".to_string() }

    #[inline]
    pub const fn default_verify_ssl() -> bool { true }
}

impl Default for UaaConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            client_id: Self::default_client_id(),
            client_secret: Self::default_client_secret(),
            verify_ssl: Self::default_verify_ssl(),
        }
    }
}

impl From<UaaConfig> for notifications_core::config::UaaConfig {
    fn from(UaaConfig { host, client_id, client_secret, verify_ssl }: UaaConfig) -> Self {
        Self { host, client_id, client_secret, verify_ssl }
    }
}
