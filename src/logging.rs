// File logging bootstrap.
//
// The terminal belongs to the UI, so log records only ever go to rotating
// files. Messages use `event=<name> module=<module> status=<status>` pairs.
//
// # Invariants
// - Initialization happens at most once per process.
// - Re-initialization with a different directory or level is rejected.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

const LOG_FILE_BASENAME: &str = "daylist";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: String,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

// Starts file logging at `level` under `log_dir`.
//
// Calling again with the same arguments is a no-op.
//
// # Errors
// - `level` is not a valid log specification.
// - `log_dir` cannot be created.
// - Logging was already started with other arguments.
pub fn init_logging(level: &str, log_dir: &Path) -> AppResult<()> {
    let level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> AppResult<LoggingState> {
        std::fs::create_dir_all(log_dir)?;

        let logger = Logger::try_with_str(&level)
            .map_err(|err| AppError::Logging(format!("invalid log level `{level}`: {err}")))?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| AppError::Logging(format!("failed to start logger: {err}")))?;

        info!(
            "event=app_start module=logging status=ok version={} level={} log_dir={}",
            env!("CARGO_PKG_VERSION"),
            level,
            log_dir.display()
        );

        Ok(LoggingState {
            level: level.clone(),
            log_dir: log_dir.to_path_buf(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir {
        return Err(AppError::Logging(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        )));
    }
    if state.level != level {
        return Err(AppError::Logging(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        )));
    }
    Ok(())
}

fn normalize_level(level: &str) -> AppResult<String> {
    let normalized = level.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(normalized),
        _ => Err(AppError::Logging(format!("unsupported log level `{level}`"))),
    }
}
