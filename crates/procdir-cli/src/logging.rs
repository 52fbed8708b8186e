use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "./logs/procdir.log";

/// Where the log file lives, split the way the appender wants it.
#[derive(Debug, PartialEq, Eq)]
struct LogFile {
    dir: PathBuf,
    name: String,
}

impl LogFile {
    fn from_path(path: &str) -> Self {
        let path = Path::new(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "procdir.log".to_string());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self { dir, name }
    }
}

/// Install stdout and file logging from `TRACING_LEVEL` and `LOG_FILE_PATH`.
/// Keep the returned guard alive until exit or buffered file lines are lost.
pub fn init_logger() -> WorkerGuard {
    let level = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    let (filter, bad_level) = match EnvFilter::try_new(&level) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(DEFAULT_LEVEL), true),
    };

    let log_file = LogFile::from_path(
        &env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
    );
    let file_appender = tracing_appender::rolling::never(&log_file.dir, &log_file.name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let terminal = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_ansi(true)
        .with_writer(std::io::stdout);
    let file = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(terminal)
        .with(file)
        .init();

    if bad_level {
        warn!("Ignoring invalid TRACING_LEVEL '{}', using {}", level, DEFAULT_LEVEL);
    }
    info!(
        "Logging to {}",
        log_file.dir.join(&log_file.name).display()
    );

    guard
}
