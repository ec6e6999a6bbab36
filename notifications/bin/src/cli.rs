use std::{io, io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use notifications_server::ApiDoc;
use snafu::ResultExt;
use utoipa::OpenApi;

use crate::{
    command::run_server,
    config::{load_server_config, Config},
    error::{self, Result},
    shadow,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file, defaults to the user configuration directory
    #[arg(long = "config", short = 'c', env = "NOTIFICATIONS_CONFIG_FILE_PATH", global = true)]
    config_file_path: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print version information
    Version,

    /// Print shell completion code for the given shell
    Completion { shell: Shell },

    /// Print the default configuration as YAML
    DefaultConfig,

    /// Load and validate the configuration without starting the server
    CheckConfig,

    /// Serve the notify and registration API
    #[command(visible_alias = "run")]
    Server,

    /// Print the `OpenAPI` document as YAML
    OpenApi,
}

fn print(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes()).context(error::WriteStdoutSnafu)?;
    stdout.flush().context(error::WriteStdoutSnafu)
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Version => print(&Self::command().render_long_version()),
            Command::Completion { shell } => {
                let mut command = Self::command();
                let bin_name = command.get_name().to_string();
                clap_complete::generate(shell, &mut command, bin_name, &mut io::stdout());
                Ok(())
            }
            Command::DefaultConfig => print(
                &serde_yaml::to_string(&Config::default())
                    .context(error::RenderYamlSnafu { what: "default configuration" })?,
            ),
            Command::CheckConfig => {
                let path = self.config_path();
                let _config = load_server_config(Config::load(&path)?)?;
                print(&format!("Configuration {} is valid\n", path.display()))
            }
            Command::Server => run_server(Config::load(self.config_path())?),
            Command::OpenApi => print(
                &ApiDoc::openapi()
                    .to_yaml()
                    .context(error::RenderYamlSnafu { what: "OpenAPI document" })?,
            ),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.config_file_path.clone().unwrap_or_else(Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() { Cli::command().debug_assert(); }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["notifications", "run", "--config", "/etc/notifications.yaml"])
            .unwrap();

        assert!(matches!(cli.command, Command::Server));
        assert_eq!(cli.config_path(), PathBuf::from("/etc/notifications.yaml"));
    }

    #[test]
    fn test_check_config_reports_missing_file() {
        let cli = Cli::try_parse_from([
            "notifications",
            "check-config",
            "-c",
            "/nonexistent/notifications.yaml",
        ])
        .unwrap();

        let err = cli.run().unwrap_err();
        assert_eq!(err.exit_code(), exitcode::CONFIG);
    }
}
