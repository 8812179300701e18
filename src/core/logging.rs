use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Targets that get their own daily log file. Everything else goes to `system.log`.
pub const LOG_TARGETS: [&str; 3] = ["recorder", "capture", "gallery"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Guards that must be kept alive to ensure logs are flushed.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

/// Returns the log file target `target` is routed to, if it has its own file.
pub fn routed_target(target: &str) -> Option<&'static str> {
    LOG_TARGETS.iter().copied().find(|name| {
        target == *name
            || target
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Routes each event to the file of its target.
struct TargetWriter {
    writers: HashMap<&'static str, NonBlocking>,
    system_writer: NonBlocking,
}

impl<'a> MakeWriter<'a> for TargetWriter {
    type Writer = Box<dyn std::io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        Box::new(self.system_writer.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        match routed_target(meta.target()).and_then(|name| self.writers.get(name)) {
            Some(writer) => Box::new(writer.clone()),
            None => Box::new(self.system_writer.clone()),
        }
    }
}

/// Installs the global subscriber writing `<target>.log` files under `log_dir`.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging(log_dir: &Path) -> Result<LoggingGuards, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let mut guards = Vec::new();
    let mut writers = HashMap::new();

    for target in LOG_TARGETS {
        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", target));
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        writers.insert(target, non_blocking);
        guards.push(guard);
    }

    let system_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "system.log");
    let (system_writer, system_guard) = tracing_appender::non_blocking(system_appender);
    guards.push(system_guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(TargetWriter {
                    writers,
                    system_writer,
                })
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(true),
        )
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Ok(LoggingGuards { _guards: guards })
}
