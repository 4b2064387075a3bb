use crate::config::{LoggingConfig, Section};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, util::SubscriberInitExt, Layer};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

// Keep a guard for non-blocking console to avoid being dropped.
static CONSOLE_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

// ================= level helpers =================

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

fn level_filter(s: &str) -> LevelFilter {
    parse_tracing_level(s)
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF)
}

// ================= rotating file writer =================

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut inner) => inner.write(buf),
            Err(poisoned) => poisoned.into_inner().write(buf),
        }
    }
    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut inner) => inner.flush(),
            Err(poisoned) => poisoned.into_inner().flush(),
        }
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn max_size_bytes(max_size_mb: Option<u64>) -> usize {
    let bytes = max_size_mb.unwrap_or(100).saturating_mul(1024 * 1024);
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

fn create_rotating_writer(section: &Section, base_dir: &Path) -> std::io::Result<RotWriter> {
    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Prefer MaxFiles if provided, else Age
    let limit = match section.max_backups {
        Some(n) => FileLimit::MaxFiles(n),
        None => FileLimit::Age(chrono::Duration::days(
            section.max_age_days.unwrap_or(1) as i64,
        )),
    };
    let max_bytes = max_size_bytes(section.max_size_mb);

    let rot = FileRotate::new(
        &log_path,
        AppendTimestamp::default(limit),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        None,
    );
    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

// ================= targets =================

/// Which level field of a [`Section`] a sink reads.
#[derive(Clone, Copy)]
enum Sink {
    Console,
    File,
}

impl Sink {
    fn level_of(self, section: &Section) -> &str {
        match self {
            Sink::Console => &section.console_level,
            Sink::File => &section.file_level,
        }
    }
}

/// "default" sets the fallback level; every other key is a target prefix.
fn build_targets(cfg: &LoggingConfig, sink: Sink) -> Targets {
    let default_level = cfg
        .get("default")
        .map(|s| level_filter(sink.level_of(s)))
        .unwrap_or(LevelFilter::INFO);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != "default")
        .fold(
            Targets::new().with_default(default_level),
            |targets, (name, section)| {
                targets.with_target(name.clone(), level_filter(sink.level_of(section)))
            },
        )
}

// ================= public init =================

/// Install the global subscriber: console (human) + optional rotating JSON file.
///
/// The file sink is taken from the "default" section; `RUST_LOG`, when set,
/// caps both sinks. Safe to call more than once: later calls are no-ops.
pub fn init_logging(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

    // Bridge `log` → `tracing` *before* installing the subscriber
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("LogTracer init skipped: {e}");
    }

    let env: Option<EnvFilter> = EnvFilter::try_from_default_env().ok();

    let (nb_stderr, guard) = tracing_appender::non_blocking(std::io::stderr());
    let _ = CONSOLE_GUARD.set(guard);

    let console_layer = fmt::layer()
        .with_writer(nb_stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, Sink::Console));

    let file_layer = cfg
        .get("default")
        .filter(|s| !s.file.trim().is_empty())
        .and_then(|section| match create_rotating_writer(section, base_dir) {
            Ok(writer) => Some(writer),
            Err(e) => {
                eprintln!("Failed to initialize log file '{}': {e}", section.file);
                None
            }
        })
        .map(|writer| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(writer)
                .with_filter(build_targets(cfg, Sink::File))
        });

    let subscriber = Registry::default()
        .with(env)
        .with(console_layer)
        .with(file_layer);

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn section(console: &str, file_level: &str) -> Section {
        Section {
            console_level: console.to_string(),
            file: String::new(),
            file_level: file_level.to_string(),
            max_age_days: None,
            max_backups: None,
            max_size_mb: None,
        }
    }

    #[test]
    fn parses_levels_leniently() {
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("bogus"), Some(Level::INFO));
    }

    #[test]
    fn targets_follow_sections_per_sink() {
        let mut cfg = HashMap::new();
        cfg.insert("default".to_string(), section("warn", "debug"));
        cfg.insert("via".to_string(), section("trace", "off"));

        let console = build_targets(&cfg, Sink::Console);
        assert!(console.would_enable("via::loader", &Level::TRACE));
        assert!(!console.would_enable("hyper", &Level::INFO));

        let file = build_targets(&cfg, Sink::File);
        assert!(!file.would_enable("via::loader", &Level::ERROR));
        assert!(file.would_enable("hyper", &Level::DEBUG));
    }

    #[test]
    fn missing_default_section_falls_back_to_info() {
        let targets = build_targets(&HashMap::new(), Sink::Console);
        assert!(targets.would_enable("anything", &Level::INFO));
        assert!(!targets.would_enable("anything", &Level::DEBUG));
    }

    #[test]
    fn max_size_saturates_instead_of_overflowing() {
        assert_eq!(max_size_bytes(None), 100 * 1024 * 1024);
        assert_eq!(max_size_bytes(Some(1)), 1024 * 1024);
        assert_eq!(max_size_bytes(Some(u64::MAX)), usize::MAX);
    }

    #[test]
    fn rotating_writer_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = section("info", "info");
        s.file = "nested/logs/app.log".to_string();
        let writer = create_rotating_writer(&s, dir.path()).unwrap();
        let mut handle = fmt::MakeWriter::make_writer(&writer);
        handle.write_all(b"hello\n").unwrap();
        handle.flush().unwrap();
        assert!(dir.path().join("nested/logs/app.log").exists());
    }
}
