//! `launch-data` argument definitions.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "launch-data",
    author,
    version,
    about = "Embed or inspect the launch data of a .NET launcher",
    long_about = None
)]
pub struct LaunchDataArgs {
    #[command(subcommand)]
    pub command: LaunchDataCommand,
}

/// `launch-data` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum LaunchDataCommand {
    /// Copy a launcher and append launch data to the copy.
    Embed(EmbedArgs),
    /// Print the launch data appended to a binary.
    Dump(DumpArgs),
}

/// Arguments for `embed`.
#[derive(Debug, Clone, Args)]
#[command(
    after_help = "Hint: `--set` is applied after `--entries`, so it overrides keys from the file."
)]
pub struct EmbedArgs {
    /// Launcher binary without launch data.
    pub launcher: PathBuf,
    /// Where the launcher copy with launch data is written.
    #[arg(long, short)]
    pub output: PathBuf,
    /// TOML file of string entries.
    #[arg(long)]
    pub entries: Option<PathBuf>,
    /// Single entry; may be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,
}

/// Arguments for `dump`.
#[derive(Debug, Clone, Args)]
pub struct DumpArgs {
    /// Binary carrying launch data.
    pub binary: PathBuf,
    #[arg(long, value_enum, default_value_t = DumpFormat::Json)]
    pub format: DumpFormat,
}

/// Output format of `dump`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DumpFormat {
    Json,
    Toml,
}

/// Parse `KEY=VALUE`, splitting on the first `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
