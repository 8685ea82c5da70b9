//! Logging configuration and initialization.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Parse a configured level name. Unknown names fall back to `info`.
fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// Open the mirror log file, creating its parent directory.
fn open_log_file(path: &Path) -> Result<Arc<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(Arc::new(File::create(path)?))
}

fn install(level: &str, writer: BoxMakeWriter, ansi: bool) {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(level).into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        )
        .with(filter)
        .init();
}

/// Initialize the logging system with the given configuration.
///
/// Console output is always enabled. When `config.file` is set, every line is
/// mirrored to that file as well, without ANSI colors.
pub fn init(config: &LoggingConfig) -> Result<()> {
    match config.file.as_deref() {
        Some(file) => {
            let log_file = open_log_file(Path::new(file))?;
            install(
                &config.level,
                BoxMakeWriter::new(std::io::stdout.and(log_file)),
                false,
            );
        }
        None => init_console_only(&config.level),
    }
    Ok(())
}

/// Initialize console-only logging.
pub fn init_console_only(level: &str) {
    install(level, BoxMakeWriter::new(std::io::stdout), true);
}
