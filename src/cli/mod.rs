//! `launch-data` command implementation.
use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::info;

use crate::launch_info::LaunchInfo;

pub mod args;

pub use args::{
    parse_key_value, DumpArgs, DumpFormat, EmbedArgs, LaunchDataArgs, LaunchDataCommand,
};

/// Execute a `launch-data` command and return the text to print.
pub fn execute_command(command: LaunchDataCommand) -> Result<String> {
    match command {
        LaunchDataCommand::Embed(args) => embed(&args),
        LaunchDataCommand::Dump(args) => dump(&args),
    }
}

fn embed(args: &EmbedArgs) -> Result<String> {
    if args.output == args.launcher {
        bail!(
            "output {} is the launcher itself; launch data must go into a copy",
            args.output.display()
        );
    }
    let mut entries = match &args.entries {
        Some(path) => read_entries_file(path)?,
        None => BTreeMap::new(),
    };
    entries.extend(args.set.iter().cloned());
    let launch_info = LaunchInfo::new(entries);
    // Validate before touching the output.
    launch_info.encode()?;

    fs::copy(&args.launcher, &args.output).with_context(|| {
        format!(
            "failed to copy {} to {}",
            args.launcher.display(),
            args.output.display()
        )
    })?;
    launch_info.append_to_binary(&args.output)?;

    let keys: Vec<&str> = launch_info.entries().keys().map(String::as_str).collect();
    info!(
        target: "dotnet_launcher::cli",
        output = %args.output.display(),
        keys = ?keys,
        "Embedded launch data"
    );
    let payload = json!({
        "status": "embedded",
        "launcher": args.launcher.display().to_string(),
        "output": args.output.display().to_string(),
        "keys": keys,
    });
    Ok(serde_json::to_string_pretty(&payload)?)
}

fn dump(args: &DumpArgs) -> Result<String> {
    let launch_info = LaunchInfo::read_from_binary(&args.binary)?;
    let rendered = match args.format {
        DumpFormat::Json => serde_json::to_string_pretty(&launch_info)?,
        DumpFormat::Toml => toml::to_string(&launch_info)?,
    };
    Ok(rendered.trim_end().to_string())
}

fn read_entries_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read entries file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| {
        format!(
            "entries file {} must be a flat table of string values",
            path.display()
        )
    })
}
