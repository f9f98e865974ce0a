//! Process-wide logging setup for the scanner binaries.
//!
//! Two back ends share one verbosity scale ([`level_for_verbosity`]):
//! a plain stderr logger for the `log` facade, and (feature `tracing`) a
//! `tracing` subscriber that also records stage spans. Lines from the plain
//! logger look like `[  0.412s  WARN region] no board candidates`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::filter::LevelFilter as TraceLevel;
#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Map a `-v` count to a level: none is `Warn`, then `Info`, `Debug`, `Trace`.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Short stage name for a `module_path!` target.
///
/// `fen_vision_region::locator::pipeline` becomes `region`; the facade crate
/// and foreign crates keep their first path segment.
fn stage(target: &str) -> &str {
    let root = target.split("::").next().unwrap_or(target);
    root.strip_prefix("fen_vision_").unwrap_or(root)
}

fn format_line(elapsed: f64, level: Level, target: &str, message: &std::fmt::Arguments<'_>) -> String {
    format!("[{elapsed:7.3}s {level:>5} {}] {message}", stage(target))
}

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

#[cfg(feature = "tracing")]
fn trace_level(level: LevelFilter) -> TraceLevel {
    match level {
        LevelFilter::Off => TraceLevel::OFF,
        LevelFilter::Error => TraceLevel::ERROR,
        LevelFilter::Warn => TraceLevel::WARN,
        LevelFilter::Info => TraceLevel::INFO,
        LevelFilter::Debug => TraceLevel::DEBUG,
        LevelFilter::Trace => TraceLevel::TRACE,
    }
}

/// Filter from `RUST_LOG`, falling back to `default_level` when the variable
/// is unset or names no directives.
#[cfg(feature = "tracing")]
fn env_filter(default_level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(trace_level(default_level).into())
        .from_env_lossy()
}

/// Install a `tracing` subscriber. `RUST_LOG` wins over `default_level`.
///
/// With `json` every event is one flat JSON object; otherwise lines carry the
/// process uptime. Stage spans are reported when they close.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = env_filter(default_level);
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
