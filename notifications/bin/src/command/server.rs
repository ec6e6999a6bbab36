use std::process;

use chrono::Utc;
use notifications_core::{ServerInfo, PROGRAM_NAME};
use snafu::ResultExt;
use tokio::runtime::Runtime;

use crate::{
    config::{load_server_config, Config},
    error::{self, Result},
    shadow::{BRANCH, PKG_VERSION, SHORT_COMMIT},
};

fn server_info() -> ServerInfo {
    ServerInfo {
        version: PKG_VERSION.to_string(),
        branch: BRANCH.to_string(),
        commit_hash: SHORT_COMMIT.to_string(),
        start_time: Utc::now(),
    }
}

/// Installs logging, then serves until a shutdown signal arrives.
pub fn run_server(config: Config) -> Result<()> {
    config.log.registry();

    let server_info = server_info();
    tracing::info!("{PROGRAM_NAME} {} is starting, pid: {}", server_info.version, process::id());

    let result = load_server_config(config).map_err(error::Error::from).and_then(|config| {
        let runtime = Runtime::new().context(error::StartRuntimeSnafu)?;
        runtime
            .block_on(notifications_server::serve_with_shutdown(config, server_info))
            .map_err(error::Error::from)
    });

    match &result {
        Ok(()) => tracing::info!("{PROGRAM_NAME} stopped"),
        Err(err) => tracing::error!(%err, "{PROGRAM_NAME} stopped"),
    }
    result
}
