use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DebugLogRotation};

const LOG_FILE_NAME: &str = "flick-debug.log";

/// Keeps the background log writer alive; drop it to flush.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize debug logging.
///
/// When `debug` is enabled, logs go to `~/.config/flick/flick-debug.log` by default.
/// The TUI owns the terminal, so nothing is ever written to stderr.
/// When `debug` is disabled, this is a no-op.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    if !config.debug {
        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or(DebugLogRotation::Session);
    let base = resolve_base_log_path(config.debug_log_path.as_deref())?;
    let (writer, log_path, guard) = open_writer(rotation, &base, config.debug_log_keep)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("flick=debug,warn"))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // already initialized in tests

    tracing::info!(log_file = %log_path.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn open_writer(
    rotation: DebugLogRotation,
    base: &Path,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    match rotation {
        DebugLogRotation::None => {
            let (writer, guard) = append_to(base)?;
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(base)?;
            create_dir(&dir)?;
            cleanup_rotated_logs(&dir, RotationKind::Daily { base_name: base_name.clone() }, keep)?;

            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Session => {
            let (dir, base_name) = split_dir_and_name(base)?;
            create_dir(&dir)?;
            cleanup_rotated_logs(&dir, RotationKind::Session { base_name: base_name.clone() }, keep)?;

            let session_path = build_session_log_path(&dir, &base_name);
            let (writer, guard) = append_to(&session_path)?;
            Ok((writer, session_path, guard))
        }
    }
}

fn append_to(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))
}

fn resolve_base_log_path(config_value: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = config_value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(crate::config::config_path()?.with_file_name(LOG_FILE_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));

    // Trailing separator or an existing directory both mean "put the log in here"
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    match (raw.strip_prefix('~'), dirs::home_dir()) {
        (Some(suffix), Some(home)) if suffix.is_empty() || suffix.starts_with('/') => {
            format!("{}{}", home.display(), suffix)
        }
        _ => raw.to_string(),
    }
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

fn build_session_log_path(dir: &Path, base_name: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{base_name}.session-{ts}"))
}

enum RotationKind {
    Daily { base_name: String },
    Session { base_name: String },
}

impl RotationKind {
    fn default_keep(&self) -> usize {
        match self {
            RotationKind::Daily { .. } => 7,
            RotationKind::Session { .. } => 20,
        }
    }

    /// Whether `name` is a rotated file of this kind
    fn matches(&self, name: &str) -> bool {
        match self {
            // tracing_appender::rolling::daily names files `{base_name}.{YYYY-MM-DD}`
            RotationKind::Daily { base_name } => name
                .strip_prefix(base_name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|suffix| !suffix.starts_with("session-")),
            RotationKind::Session { base_name } => name
                .strip_prefix(base_name.as_str())
                .is_some_and(|rest| rest.starts_with(".session-")),
        }
    }
}

fn cleanup_rotated_logs(dir: &Path, kind: RotationKind, keep: Option<usize>) -> Result<()> {
    let keep = keep.unwrap_or_else(|| kind.default_keep());
    if keep == 0 {
        return Ok(());
    }

    let mut candidates: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| kind.matches(name))
        .collect();

    // Both suffix formats sort chronologically
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    for name in candidates.into_iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// Mask `api_key=` query values so request URLs and transport errors can be logged.
pub fn redact_secrets(input: &str) -> String {
    const MARKER: &str = "api_key=";

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(MARKER) {
        let value_start = pos + MARKER.len();
        out.push_str(&rest[..value_start]);

        let value = &rest[value_start..];
        let value_len = value
            .find(|c: char| c == '&' || c == '#' || c == ')' || c.is_whitespace())
            .unwrap_or(value.len());
        if value_len > 0 {
            out.push_str("***REDACTED***");
        }
        rest = &value[value_len..];
    }

    out.push_str(rest);
    out
}
