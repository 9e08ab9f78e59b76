//! Entry point for the .NET launcher shim.
use std::process::ExitCode;

use dotnet_launcher::launcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match launcher::run_from_process().await {
        Ok(code) => code,
        Err(exit) => exit.report(),
    }
}
