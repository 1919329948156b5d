//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, creates the tokio
//! runtime, dispatches to a command and handles all error output.

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::utils::error::ConfigError;
use crate::utils::logging;
use crate::utils::redaction::redact_secrets;
use crate::{CliArgs, Config, ExitCode, LearnSphereError};

/// Main CLI execution function.
///
/// Prints all output, including errors. Returns the exit code to use on
/// failure; main.rs only calls `std::process::exit`.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        model: cli.model.clone(),
        temperature: cli.temperature,
        request_timeout: cli.timeout,
        llm_provider: cli.provider.clone(),
        verbose: cli.verbose.then_some(true),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = match err.downcast::<ConfigError>() {
                Ok(config_err) => LearnSphereError::Config(config_err),
                Err(other) => LearnSphereError::Config(ConfigError::InvalidFile(format!("{other:#}"))),
            };
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    if let Err(e) = logging::init_tracing(config.verbose()) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Generate {
                url,
                reload_token,
                seed_spec,
                seed_code,
                edit_spec,
                edit_code,
                emit,
                json,
            } => {
                let options = commands::GenerateOptions {
                    url,
                    reload_token,
                    seed_spec,
                    seed_code,
                    edit_spec,
                    edit_code,
                    emit,
                    json,
                };
                commands::execute_generate_command(&options, &config).await
            }
            Commands::Code { spec_file } => {
                commands::execute_code_command(&spec_file, &config).await
            }
            Commands::Config { json } => commands::execute_config_command(json, &config),
        }
    });

    if let Err(error) = result {
        if let Some(learnsphere_error) = error.downcast_ref::<LearnSphereError>() {
            eprintln!("{}", learnsphere_error.display_for_user());
            return Err(learnsphere_error.to_exit_code());
        }

        eprintln!("✗ Unexpected error: {}", redact_secrets(&format!("{error:#}")));
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}
