//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `urlsup_action` library that handles:
//! - Command-line argument and environment parsing
//! - Logger initialization
//! - Publishing the run to the console and the GitHub Actions surfaces
//!
//! All core functionality is implemented in the library crate.

use std::process;

use clap::Parser;

use urlsup_action::initialization::init_logger_with;
use urlsup_action::render::{publish_error, publish_report};
use urlsup_action::run::EXIT_CONFIG_ERROR;
use urlsup_action::{evaluate_exit_code, exit_code_for_error, run_sharded, Opt, SystemExecutor};

#[tokio::main]
async fn main() {
    let config = match Opt::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("urlsup-action error: {:#}", e);
            process::exit(EXIT_CONFIG_ERROR);
        }
    };

    if let Err(e) = init_logger_with(config.log_level.clone().into(), config.log_format.clone()) {
        eprintln!("urlsup-action error: Failed to initialize logger: {e}");
    }

    let executor = SystemExecutor::new();
    let result = run_sharded(
        &config.params,
        config.shard_size,
        config.parallel_shards,
        &executor,
    )
    .await;

    let exit_code = match result {
        Ok(report) => {
            let exit_code = evaluate_exit_code(&report.outcome, config.fail_on_error);
            publish_report(&config, &report, exit_code);
            exit_code
        }
        Err(err) => {
            let exit_code = exit_code_for_error(&err);
            publish_error(&config, &err, exit_code);
            exit_code
        }
    };
    process::exit(exit_code);
}
