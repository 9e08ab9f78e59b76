//! Turns launch data and the launcher's command line into a runtime invocation.
use tracing::debug;

use crate::{
    config::RuntimeSection,
    launch_info::LaunchInfo,
    lib::{
        errors::LaunchError,
        telemetry::{self, LaunchTelemetry},
    },
    runfiles::RunfilesResolver,
};

pub mod arguments;
pub mod environment;
pub mod host;
pub mod resolve;
mod startup;
#[cfg(test)]
pub(crate) mod testing;

pub use arguments::{artifact_path, rewrite_arguments, ArtifactSuffix};
pub use environment::{parse_env_assignments, prepare_environment, PreparedEnvironment};
pub use host::{escape_windows_arg, LaunchArg, LaunchCommand, LaunchHost, SystemLaunchHost};
pub use resolve::{is_sentinel, resolve_binary, ResolvedBinary};
pub use startup::{launcher_path, run, run_from_process, LauncherExit};

pub const BINARY_TYPE: &str = "binary_type";
pub const DOTNET_BIN_PATH: &str = "dotnet_bin_path";
pub const DOTNET_ENV: &str = "dotnet_env";
pub const DOTNET_CMD: &str = "dotnet_cmd";
pub const DOTNET_ARGS: &str = "dotnet_args";
pub const ASSEMBLY_ARGS: &str = "assembly_args";
pub const DOTNET_LOGGER: &str = "dotnet_logger";
pub const LOG_PATH_ARG_NAME: &str = "log_path_arg_name";
pub const XML_OUTPUT_FILE_ENV: &str = "XML_OUTPUT_FILE";
const DEFAULT_XML_OUTPUT_FILE: &str = "test.xml";
const TEST_COMMAND: &str = "test";

/// Launcher flavour selected by the `binary_type` launch-data key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherVariant {
    /// Runs `<App>.dll`; `dotnet_env` is required.
    Dotnet,
    /// Runs `<App>` without an extension; `dotnet_env` is optional.
    DotnetLegacy,
}

impl LauncherVariant {
    pub fn from_binary_type(binary_type: &str) -> Result<Self, LaunchError> {
        match binary_type {
            "Dotnet" => Ok(Self::Dotnet),
            "DotnetLegacy" => Ok(Self::DotnetLegacy),
            other => Err(LaunchError::UnknownBinaryType {
                binary_type: other.to_string(),
            }),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dotnet => "Dotnet",
            Self::DotnetLegacy => "DotnetLegacy",
        }
    }

    pub const fn artifact_suffix(&self) -> ArtifactSuffix {
        match self {
            Self::Dotnet => ArtifactSuffix::Append,
            Self::DotnetLegacy => ArtifactSuffix::Keep,
        }
    }

    const fn requires_env(&self) -> bool {
        matches!(self, Self::Dotnet)
    }
}

/// Everything decided before the child is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub variant: LauncherVariant,
    pub binary: ResolvedBinary,
    pub command: LaunchCommand,
}

/// Parameterized launcher over injected host and runfiles capabilities.
pub struct Launcher<'a, H, R: ?Sized> {
    info: &'a LaunchInfo,
    runtime: &'a RuntimeSection,
    runfiles: &'a R,
    host: &'a H,
}

impl<'a, H, R> Launcher<'a, H, R>
where
    H: LaunchHost,
    R: RunfilesResolver + ?Sized,
{
    pub fn new(
        info: &'a LaunchInfo,
        runtime: &'a RuntimeSection,
        runfiles: &'a R,
        host: &'a H,
    ) -> Self {
        Self {
            info,
            runtime,
            runfiles,
            host,
        }
    }

    /// Compute the invocation without side effects.
    pub fn plan(&self, args: &[String]) -> Result<LaunchPlan, LaunchError> {
        let variant = LauncherVariant::from_binary_type(self.info.require(BINARY_TYPE)?)?;
        let configured = self.info.require(DOTNET_BIN_PATH)?;

        let dotnet_env = if variant.requires_env() {
            Some(self.info.require(DOTNET_ENV)?)
        } else {
            self.info.get(DOTNET_ENV)
        };
        let env = prepare_environment(dotnet_env, self.runfiles, self.host)?;

        let binary = resolve_binary(configured, self.runtime, self.runfiles, self.host);

        let (artifact, user_args) = rewrite_arguments(
            args,
            variant.artifact_suffix(),
            &self.runtime.artifact_extension,
            self.host,
        )
        .ok_or(LaunchError::MissingArgv0)?;

        let dotnet_cmd = self.info.get(DOTNET_CMD).filter(|cmd| !cmd.is_empty());
        let mut launch_args: Vec<LaunchArg> = dotnet_cmd
            .map(|cmd| LaunchArg::Verbatim(cmd.to_string()))
            .into_iter()
            .chain(self.info.list(DOTNET_ARGS).into_iter().map(LaunchArg::Verbatim))
            .collect();
        launch_args.push(artifact);
        launch_args.extend(self.info.list(ASSEMBLY_ARGS).into_iter().map(LaunchArg::Verbatim));
        launch_args.extend(user_args);
        if dotnet_cmd == Some(TEST_COMMAND) {
            launch_args.push(LaunchArg::Verbatim("--logger".to_string()));
            launch_args.push(LaunchArg::Verbatim(self.test_logger_arg()?));
        }

        let command = LaunchCommand {
            program: binary.path.clone(),
            args: launch_args,
            env,
        };
        debug!(
            target: "dotnet_launcher::launch",
            variant = variant.as_str(),
            argv = ?command.argv(),
            "Planned launch"
        );
        Ok(LaunchPlan {
            variant,
            binary,
            command,
        })
    }

    /// Plan, spawn, and wait. Returns the child's exit code.
    pub async fn launch(&self, args: &[String]) -> Result<i32, LaunchError> {
        let plan = self.plan(args)?;
        let argv = plan.command.argv();
        telemetry::emit_launch(&LaunchTelemetry {
            binary_type: plan.variant.as_str(),
            binary: &plan.binary.path,
            used_fallback: plan.binary.used_fallback,
            args: &argv,
            env_keys: plan.command.env.keys(),
        });

        let exit_code = self.host.launch(plan.command).await?;
        telemetry::emit_exit(&plan.binary.path, exit_code);
        Ok(exit_code)
    }

    fn test_logger_arg(&self) -> Result<String, LaunchError> {
        let logger = self.info.require(DOTNET_LOGGER)?;
        let arg_name = self.info.require(LOG_PATH_ARG_NAME)?;
        let xml_file = self
            .host
            .env_var(XML_OUTPUT_FILE_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_XML_OUTPUT_FILE.to_string());
        Ok(format!("{logger};{arg_name}={xml_file}"))
    }
}
