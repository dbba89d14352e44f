//! reqopts CLI
//!
//! This file contains only logging setup and CLI dispatch. Command
//! implementations live in the `commands/` module.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use reqopts::commands::CallArgs;
use reqopts::{
    Cli, Commands, ConfigCommands, ReqoptsConfig, cmd_call, cmd_config_path, cmd_config_show,
    cmd_demo,
};

fn init_logging(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,reqopts=info".to_string(),
            2 => "info,reqopts=debug".to_string(),
            _ => "debug,reqopts=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose >= 2),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = ReqoptsConfig::load()?;

    match cli.command {
        Commands::Call {
            url,
            method,
            query,
            data,
            data_file,
            accept,
            invalid_token,
            auth,
        } => cmd_call(
            CallArgs {
                url,
                method,
                query,
                data,
                data_file,
                accept,
                invalid_token,
            },
            &auth,
            &config,
        ),

        Commands::Demo { url, auth } => cmd_demo(&url, &auth, &config),

        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(&config),
            ConfigCommands::Path => cmd_config_path(),
        },
    }
}
