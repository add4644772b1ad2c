//! The `tilegen` command: generate one terrain tile and write its preview.

use std::process::ExitCode;

use clap::Parser;
use tilegen_app::{generate, load_config};
use tilegen_config::CliArgs;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Logging is configured from the loaded config, so failures before that
    // point can only go to stderr.
    let (dirs, config) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("tilegen: {err}");
            return ExitCode::FAILURE;
        }
    };

    tilegen_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(config_dir = %dirs.config_dir.display(), "tilegen starting");

    match generate(&config) {
        Ok(written) => {
            for path in written {
                info!(path = %path.display(), "preview written");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "tile generation failed");
            ExitCode::FAILURE
        }
    }
}
