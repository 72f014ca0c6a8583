//! This crate provides logging initialization for the n8n MCP server.
//!
//! It supports three modes:
//! - ServerDeployed mode: human-readable logs to STDOUT.
//! - ServerJson mode: JSON logs to STDOUT, one object per line.
//! - ServerFile mode: logs to STDERR and to a rolling file in a given directory.
//!
//! File logs are rolled over when they reach 5 MB. Rotated logs are
//! compressed. The maximum number of rotated logs is 20.

use anyhow::{Context, Result};
use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt};

pub const LOG_FILE_NAME: &str = "n8n-mcp-server.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMode {
    ServerDeployed,
    ServerJson,
    ServerFile { log_dir: PathBuf },
}

/// Guard that keeps background logging workers alive.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

pub fn init(mode: LogMode, verbose: bool) -> Result<Option<LoggingGuards>> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match mode {
        LogMode::ServerDeployed => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(std::io::stdout().is_terminal())
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
            Ok(None)
        }
        LogMode::ServerJson => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .json()
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
            Ok(None)
        }
        LogMode::ServerFile { log_dir } => {
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

            let writer = FileRotate::new(
                log_file_path(&log_dir),
                AppendCount::new(20),
                ContentLimit::Bytes(5 * 1024 * 1024),
                Compression::OnRotate(1),
                None,
            );

            let (file_non_blocking, file_guard) = tracing_appender::non_blocking(writer);
            // Nobody may be draining stderr under a process supervisor.
            // Bound the buffer and drop lines past the limit.
            let (stderr_non_blocking, stderr_guard) = NonBlockingBuilder::default()
                .lossy(true)
                .buffered_lines_limit(10_000)
                .finish(std::io::stderr());

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(
                    file_non_blocking
                        .with_max_level(tracing::Level::INFO)
                        .and(stderr_non_blocking),
                )
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;

            Ok(Some(LoggingGuards {
                _guards: vec![file_guard, stderr_guard],
            }))
        }
    }
}
