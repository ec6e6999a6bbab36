use std::io;

use snafu::Snafu;

use crate::config;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Config { source: config::Error },

    #[snafu(display("{source}"))]
    Serve { source: notifications_server::Error },

    #[snafu(display("Could not start async runtime, error: {source}"))]
    StartRuntime { source: io::Error },

    #[snafu(display("Could not render {what} as YAML, error: {source}"))]
    RenderYaml { what: &'static str, source: serde_yaml::Error },

    #[snafu(display("Could not write to standard output, error: {source}"))]
    WriteStdout { source: io::Error },
}

impl From<config::Error> for Error {
    fn from(source: config::Error) -> Self { Self::Config { source } }
}

impl From<notifications_server::Error> for Error {
    fn from(source: notifications_server::Error) -> Self { Self::Serve { source } }
}

impl Error {
    /// Process exit code reported for this error.
    pub const fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Config { .. } => exitcode::CONFIG,
            Self::Serve { .. } | Self::RenderYaml { .. } => exitcode::SOFTWARE,
            Self::StartRuntime { .. } => exitcode::OSERR,
            Self::WriteStdout { .. } => exitcode::IOERR,
        }
    }
}
