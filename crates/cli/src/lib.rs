//! Argument parsing and top-level dispatch for the `paragrep` binary.
//!
//! Every worker process is the same executable re-exec'd with a hidden
//! `--worker <id> <file>` form; [`run`] inspects the raw argument vector
//! before handing anything to `clap` so that internal form never appears in
//! `--help` or shell completions.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use common::{ErrorKind, ExitCode};

/// Searches paragraphs in a large text file against a POSIX extended
/// regular expression, splitting the work across a pool of worker
/// processes.
#[derive(Parser, Debug)]
#[command(name = "paragrep", version, about)]
struct Cli {
    /// POSIX extended regular expression a paragraph must contain a whole-word match of.
    pattern: String,

    /// Path to the input file to scan.
    file: PathBuf,

    /// Number of worker processes to run.
    num_workers: u32,

    /// Path to the CSV performance log to write, one row per chunk processed.
    logfile: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("--num-workers must be between 1 and {max}, got {got}")]
    WorkerCount { got: u32, max: u32 },

    #[error(transparent)]
    Matcher(#[from] matcher::MatcherError),

    #[error("opening log file: {0}")]
    LogFile(#[source] io::Error),

    #[error(transparent)]
    Coordinator(#[from] engine::CoordinatorError),

    #[error(transparent)]
    Worker(#[from] worker::WorkerError),

    #[error("locating the current executable to re-exec as a worker: {0}")]
    CurrentExe(#[source] io::Error),

    #[error("--worker requires a worker id and a file path")]
    WorkerArgs,

    #[error("--worker id is not a valid number: {0}")]
    WorkerId(#[source] std::num::ParseIntError),
}

impl AppError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) | Self::WorkerCount { .. } | Self::WorkerArgs | Self::WorkerId(_) => {
                ErrorKind::Usage
            }
            Self::Matcher(e) => e.kind(),
            Self::LogFile(_) | Self::CurrentExe(_) => ErrorKind::FileOpen,
            Self::Coordinator(e) => e.kind(),
            Self::Worker(e) => e.kind(),
        }
    }
}

/// Maps a terminal error to the process exit code it should produce.
#[must_use]
pub fn exit_code_from(err: &AppError) -> ExitCode {
    err.kind().exit_code()
}

/// Parses `args` and runs either the coordinator or a worker, depending on
/// whether the hidden `--worker` form is present. `args` includes the
/// program name in position zero, matching `std::env::args_os`.
pub fn run<I, S>(args: I, stdout: &mut impl Write) -> Result<(), AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if args.get(1).map(OsString::as_os_str) == Some(std::ffi::OsStr::new("--worker")) {
        return run_worker(&args);
    }

    let cli = Cli::try_parse_from(args)?;
    run_coordinator(&cli, stdout)
}

fn run_worker(args: &[OsString]) -> Result<(), AppError> {
    let worker_id = args
        .get(2)
        .ok_or(AppError::WorkerArgs)?
        .to_string_lossy()
        .parse::<u32>()
        .map_err(AppError::WorkerId)?;
    let file = args.get(3).ok_or(AppError::WorkerArgs)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    worker::run(worker_id, file.as_ref(), stdin.lock(), stdout.lock())?;
    Ok(())
}

fn run_coordinator(cli: &Cli, stdout: &mut impl Write) -> Result<(), AppError> {
    if cli.num_workers == 0 || cli.num_workers > common::MAX_WORKERS {
        return Err(AppError::WorkerCount {
            got: cli.num_workers,
            max: common::MAX_WORKERS,
        });
    }

    let pattern = matcher::Matcher::compile(&cli.pattern)?;
    let log_file = File::create(&cli.logfile).map_err(AppError::LogFile)?;
    let self_exe = std::env::current_exe().map_err(AppError::CurrentExe)?;

    engine::run(&self_exe, &cli.file, cli.num_workers, &pattern, log_file, stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_workers() {
        let cli = Cli::try_parse_from(["paragrep", "pat", "/tmp/does-not-matter", "0", "/tmp/log.csv"])
            .unwrap();
        let mut out = Vec::new();
        let err = run_coordinator(&cli, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn rejects_too_many_workers() {
        let cli = Cli::try_parse_from(["paragrep", "pat", "/tmp/does-not-matter", "9999", "/tmp/log.csv"])
            .unwrap();
        let mut out = Vec::new();
        let err = run_coordinator(&cli, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn rejects_an_invalid_pattern_before_touching_the_file() {
        let cli = Cli::try_parse_from(["paragrep", "(unclosed", "/tmp/does-not-matter", "2", "/tmp/log.csv"])
            .unwrap();
        let mut out = Vec::new();
        let err = run_coordinator(&cli, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Regex);
    }

    #[test]
    fn missing_positional_arguments_are_a_usage_error() {
        let mut out = Vec::new();
        let err = run(["paragrep", "only-a-pattern"], &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn worker_form_requires_an_id_and_a_file() {
        let mut out = Vec::new();
        let err = run(["paragrep", "--worker"], &mut out).unwrap_err();
        assert!(matches!(err, AppError::WorkerArgs));
    }
}
