mod cli;
mod command;
mod config;
mod error;
mod shadow {
    #![allow(clippy::needless_raw_string_hashes)]
    use shadow_rs::shadow;
    shadow!(build);

    pub use self::build::*;
}

use std::process::ExitCode;

use clap::Parser;
use notifications_core::PROGRAM_NAME;

fn main() -> ExitCode {
    match cli::Cli::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{PROGRAM_NAME}: {err}");
            // exit codes of `exitcode` are within 0..=255
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
