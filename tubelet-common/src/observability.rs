//! Logging setup shared by the `tubelet` binary and the integration tests.
//!
//! A media-center host starts a fresh process for every navigation action, so
//! [`init_logging`] is cheap and idempotent: each invocation appends to the
//! same daily file and a second call only returns the path already in use.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Overrides whatever directory the caller configured.
pub const LOG_DIR_ENV: &str = "TUBELET_LOG_DIR";
/// `json` selects [`LogFormat::Json`] in [`LogFormat::from_env`].
pub const LOG_FORMAT_ENV: &str = "TUBELET_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn json_if(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    pub fn from_env() -> Self {
        Self::json_if(
            std::env::var(LOG_FORMAT_ENV)
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        )
    }

    fn layer<S, W>(self, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        match self {
            Self::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
            Self::Json => fmt::layer().json().with_writer(writer).boxed(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log file stem; the appender adds the date.
    pub app_name: &'static str,
    /// Usually `<profile>/logs`. Without one the system temp dir is used.
    pub log_dir: Option<PathBuf>,
    /// Stdout belongs to the host protocol, so the mirror goes to stderr.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "tubelet",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let stem = format!("{}.log", config.app_name);
    let path = dir.join(format!("{stem}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &stem));
    let _ = LOG_GUARD.set(guard);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));
    let stderr = config
        .emit_stderr
        .then(|| config.format.layer(std::io::stderr, true));

    tracing_subscriber::registry()
        .with(config.format.layer(writer, false))
        .with(stderr)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    tracing::debug!(path=%path.display(), "logging.ready");
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

fn resolve_log_dir(app_name: &str, configured: Option<&Path>) -> PathBuf {
    match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => configured
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::temp_dir().join(app_name)),
    }
}
