//! Entry point for the `launch-data` tool.
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dotnet_launcher::{
    cli::{execute_command, LaunchDataArgs},
    config::LauncherConfig,
    lib::telemetry,
};

fn main() -> ExitCode {
    match bootstrap() {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("launch-data: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn bootstrap() -> Result<String> {
    let filter_handle = telemetry::init_tracing(&telemetry::bootstrap_filter())?;
    let config = LauncherConfig::load_from_env()?;
    telemetry::apply_filter(
        filter_handle.as_ref(),
        telemetry::select_filter(config.log.as_deref(), config.debug),
    )?;
    let args = LaunchDataArgs::parse();
    execute_command(args.command)
}
