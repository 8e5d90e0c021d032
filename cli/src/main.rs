use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod input;
mod output;
mod settings;
pub mod ux_error;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Commands::Languages(args) = &cli.command {
        return commands::languages::run(args, cli.global.json);
    }

    let config = match settings::resolve(&cli.global) {
        Ok(config) => config,
        Err(err) => {
            ux_error::from_dialogue_error(&err).display();
            return Ok(ExitCode::FAILURE);
        }
    };

    init_tracing(&config.observability.log_level, config.observability.json_logs);

    match cli.command {
        Commands::Guide(args) => commands::ask::run_guide(args, &cli.global, config).await,
        Commands::Translate(args) => {
            commands::ask::run_translate(args, &cli.global, config).await
        }
        Commands::Languages(_) => Ok(ExitCode::SUCCESS)
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}
