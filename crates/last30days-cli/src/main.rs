mod args;
mod config;
mod service;

use args::Args;
use clap::{CommandFactory, Parser};
use config::Config;
use service::ResearchService;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit with status 2 before anything else happens
    let args = Args::parse();
    if args.topic().is_empty() {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "the topic must not be blank",
            )
            .exit();
    }

    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = last30days_logging::init_logging(&config.logging.level, args.debug) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let research = ResearchService::new(config, args);
    let mode = match research.source_mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match research.run(mode).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
