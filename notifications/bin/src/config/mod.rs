mod cloud_controller;
mod error;
mod postgres;
mod uaa;
mod web;

use std::path::{Path, PathBuf};

use notifications_cli_common::config::LogConfig;
use notifications_core::config::DEFAULT_UAA_SCOPES;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};

pub use self::{
    cloud_controller::CloudControllerConfig, error::Error, postgres::PostgresConfig,
    uaa::UaaConfig, web::WebConfig,
};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub postgres: PostgresConfig,

    #[serde(default)]
    pub uaa: UaaConfig,

    #[serde(default)]
    pub cloud_controller: CloudControllerConfig,

    #[serde(default)]
    pub default_scopes: DefaultScopes,
}

/// Scopes that can not be targeted by a UAA scope notification.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DefaultScopes(pub Vec<String>);

impl Default for DefaultScopes {
    fn default() -> Self { Self(DEFAULT_UAA_SCOPES.iter().map(ToString::to_string).collect()) }
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [
            notifications_core::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(notifications_core::CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(&path)
            .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

        Self::from_yaml(&data, path.as_ref())
    }

    fn from_yaml(data: &str, path: &Path) -> Result<Self, Error> {
        let mut config: Self = serde_yaml::from_str(data)
            .context(error::ParseConfigSnafu { filename: path.to_path_buf() })?;

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }
}

#[inline]
pub fn load_server_config(
    Config {
        web,
        postgres,
        uaa,
        cloud_controller,
        default_scopes: DefaultScopes(default_scopes),
        ..
    }: Config,
) -> Result<notifications_core::config::Config, Error> {
    ensure!(
        default_scopes.iter().all(|scope| !scope.trim().is_empty()),
        error::EmptyDefaultScopeSnafu
    );

    Ok(notifications_core::config::Config {
        web: web.into(),
        postgres: postgres.into(),
        uaa: uaa.into(),
        cloud_controller: cloud_controller.into(),
        default_scopes,
    })
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let text = serde_yaml::to_string(&Config::default()).unwrap();
        let config = Config::from_yaml(&text, Path::new("default.yaml")).unwrap();

        assert_eq!(config.web, WebConfig::default());
        assert_eq!(config.default_scopes, DefaultScopes::default());
        assert_eq!(config.uaa.host, UaaConfig::default_host());
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let text = r"
web:
  host: 0.0.0.0
  port: 8080
uaa:
  host: https://uaa.example.com
  client_id: notifications-sender
cloud_controller:
  url: https://api.example.com
  verify_ssl: false
";
        let config = Config::from_yaml(text, Path::new("partial.yaml")).unwrap();
        let server_config = load_server_config(config).unwrap();

        assert_eq!(
            server_config.web.listen_address,
            std::net::SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
        );
        assert_eq!(server_config.uaa.host, "https://uaa.example.com");
        assert_eq!(server_config.uaa.client_id, "notifications-sender");
        assert_eq!(server_config.uaa.client_secret, UaaConfig::default_client_secret());
        assert!(server_config.uaa.verify_ssl);
        assert!(!server_config.cloud_controller.verify_ssl);
        assert_eq!(server_config.postgres.port, PostgresConfig::default_port());
        assert_eq!(server_config.default_scopes.len(), DEFAULT_UAA_SCOPES.len());
        assert!(server_config.default_scopes.iter().any(|scope| scope == "scim.me"));
    }

    #[test]
    fn test_default_scopes_can_be_overridden() {
        let text = "default_scopes:\n  - openid\n  - uaa.user\n";
        let config = Config::from_yaml(text, Path::new("scopes.yaml")).unwrap();
        let server_config = load_server_config(config).unwrap();

        assert_eq!(server_config.default_scopes, vec!["openid", "uaa.user"]);
    }

    #[test]
    fn test_rejects_empty_default_scope() {
        let text = "default_scopes:\n  - openid\n  - ''\n";
        let config = Config::from_yaml(text, Path::new("scopes.yaml")).unwrap();

        assert!(matches!(load_server_config(config), Err(Error::EmptyDefaultScope)));
    }

    #[test]
    fn test_invalid_yaml_is_reported_with_filename() {
        let err = Config::from_yaml("web: [", Path::new("broken.yaml")).unwrap_err();

        assert!(matches!(err, Error::ParseConfig { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }
}
