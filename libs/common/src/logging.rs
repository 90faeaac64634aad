//! Logging bootstrap for emberlink tools
//!
//! Console output uses a compact `timestamp [LEVEL] message` layout. An
//! optional daily rolling file is written through a non-blocking appender.

use std::fs;
use std::sync::OnceLock;

use errors::{EmberError, EmberResult};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, LoggingConfig};

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "emberlink.log";

// Keeps the file writer alive for the process lifetime
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] message`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Build the level filter
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn build_filter(level: &str) -> EmberResult<EnvFilter> {
    if let Ok(env_str) = std::env::var("RUST_LOG") {
        if !env_str.is_empty() {
            return EnvFilter::try_new(&env_str).map_err(|e| EmberError::InvalidConfig {
                field: "RUST_LOG".to_string(),
                reason: e.to_string(),
            });
        }
    }
    EnvFilter::try_new(level).map_err(|e| EmberError::InvalidConfig {
        field: "logging.level".to_string(),
        reason: e.to_string(),
    })
}

/// Initialize the global subscriber
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place and return `Ok`.
pub fn init_logging(config: &LoggingConfig) -> EmberResult<()> {
    let filter = build_filter(&config.level)?;

    let console_layer = match config.format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .event_format(BracketedLevelFormat)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    let file_layer = match &config.directory {
        Some(dir) if FILE_GUARD.get().is_none() => {
            fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .boxed(),
            )
        },
        _ => None,
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    match result {
        Ok(()) => {
            tracing::debug!("Logging initialized at level {}", config.level);
            Ok(())
        },
        // Already initialized by an earlier call or a test harness
        Err(_) => Ok(()),
    }
}
