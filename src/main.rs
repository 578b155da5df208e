use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fintrack::{
    backend::Backend,
    commands,
    config::{CliArgs, Config, LoggingConfig},
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // stdout carries command output, so logs go to stderr.
    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.logging);

    let backend = match Backend::open(&config.storage) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open storage");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&backend, &cli.command) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
