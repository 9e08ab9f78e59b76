use std::{
    env,
    path::{self, Path, PathBuf},
    process::ExitCode,
};

use anyhow::Error;
use tracing::debug;

use crate::{
    config::LauncherConfig,
    launch_info::LaunchInfo,
    lib::{errors::LaunchError, telemetry},
    runfiles::Runfiles,
};

use super::{
    host::{LaunchHost, SystemLaunchHost},
    Launcher,
};

const ERROR_PREFIX: &str = "LAUNCHER ERROR";

/// Bundles a fatal launcher error with the exit code to report.
#[derive(Debug)]
pub struct LauncherExit {
    message: String,
    exit_code: ExitCode,
}

impl LauncherExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:#}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn report(self) -> ExitCode {
        eprintln!("{ERROR_PREFIX}: {}", self.message);
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

impl From<LaunchError> for LauncherExit {
    fn from(err: LaunchError) -> Self {
        Self::from_error(err)
    }
}

/// Map a child exit code onto this process's exit code.
///
/// Codes outside `0..=255` cannot be represented portably and become a failure.
pub fn exit_code_for(code: i32) -> ExitCode {
    u8::try_from(code)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}

/// The absolute path the launcher was invoked as.
///
/// `argv[0]` is kept when it names a location, so runfiles beside a symlinked
/// launcher are found. Relative forms are made absolute against the current
/// directory without resolving symlinks. A bare command name is replaced by
/// the running executable.
pub fn launcher_path(argv0: Option<&str>) -> Result<PathBuf, LaunchError> {
    let argv0 = argv0
        .filter(|value| !value.is_empty())
        .ok_or(LaunchError::MissingArgv0)?;
    let has_directory = Path::new(argv0)
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if has_directory {
        return path::absolute(argv0).map_err(|source| LaunchError::LauncherPath {
            path: PathBuf::from(argv0),
            source,
        });
    }
    env::current_exe().map_err(|source| LaunchError::CurrentExe { source })
}

/// Read the launch data embedded in `binary` and run the configured runtime.
///
/// `args[0]` is replaced by [`launcher_path`] before it drives runfiles
/// discovery and artifact mapping.
pub async fn run<H: LaunchHost>(
    binary: &Path,
    args: &[String],
    config: &LauncherConfig,
    host: &H,
) -> Result<i32, LaunchError> {
    let info = LaunchInfo::read_from_binary(binary)?;

    let exe = launcher_path(args.first().map(String::as_str))?;
    debug!(
        target: "dotnet_launcher::startup",
        launcher = %exe.display(),
        "Resolved launcher path"
    );
    let mut args = args.to_vec();
    if let Some(argv0) = args.first_mut() {
        *argv0 = exe.to_string_lossy().into_owned();
    }

    let cwd = env::current_dir().ok();
    let runfiles = Runfiles::discover(&exe, cwd.as_deref(), |key| host.env_var(key));

    Launcher::new(&info, &config.runtime, &runfiles, host)
        .launch(&args)
        .await
}

/// Entry point used by the shim binary.
///
/// Tracing starts from the environment so configuration loading is logged,
/// then switches to the configured filter.
pub async fn run_from_process() -> Result<ExitCode, LauncherExit> {
    let filter_handle =
        telemetry::init_tracing(&telemetry::bootstrap_filter()).map_err(LauncherExit::from_error)?;
    let config = LauncherConfig::load_from_env().map_err(LauncherExit::from_error)?;
    telemetry::apply_filter(
        filter_handle.as_ref(),
        telemetry::select_filter(config.log.as_deref(), config.debug),
    )
    .map_err(LauncherExit::from_error)?;

    let args: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let binary = env::current_exe().map_err(|source| LaunchError::CurrentExe { source })?;

    let code = run(&binary, &args, &config, &SystemLaunchHost).await?;
    Ok(exit_code_for(code))
}
