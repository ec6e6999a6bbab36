use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CloudControllerConfig {
    /// Cloud Controller API URL (e.g., <https://api.example.com>)
    #[serde(default = "CloudControllerConfig::default_url")]
    pub url: String,

    #[serde(default = "CloudControllerConfig::default_verify_ssl")]
    pub verify_ssl: bool,
}

impl CloudControllerConfig {
    #[inline]
    pub fn default_url() -> String { "http://localhost:9022".to_string() }

    #[inline]
    pub const fn default_verify_ssl() -> bool { true }
}

impl Default for CloudControllerConfig {
    fn default() -> Self { Self { url: Self::default_url(), verify_ssl: Self::default_verify_ssl() } }
}

impl From<CloudControllerConfig> for notifications_core::config::CloudControllerConfig {
    fn from(CloudControllerConfig { url, verify_ssl }: CloudControllerConfig) -> Self {
        Self { url, verify_ssl }
    }
}
