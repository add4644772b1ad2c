//! Structured logging for the tile generator.
//!
//! Console output goes through `tracing-subscriber` with uptime timestamps and
//! thread names, so records from `map-gen-worker-*` threads are easy to tell
//! apart. A JSON file layer can be added for post-mortem analysis. Records
//! emitted through the `log` facade (the config crate uses it) are captured
//! as well.

use std::path::{Path, PathBuf};

use tilegen_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file inside the log directory.
pub const LOG_FILE_NAME: &str = "tilegen.log";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.debug.log_level`, which wins over
/// [`DEFAULT_FILTER`]. When `log_dir` is given and either `debug_build` or
/// `config.debug.log_to_file` is set, JSON records are also written to
/// `log_dir/tilegen.log`. A log file that cannot be created is skipped.
///
/// Panics if a global subscriber is already installed.
///
/// ```no_run
/// use tilegen_config::Config;
/// use tilegen_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let wants_file = debug_build || config.is_some_and(|c| c.debug.log_to_file);
    if wants_file
        && let Some(log_path) = log_dir.and_then(prepare_log_file)
        && let Ok(log_file) = std::fs::File::create(&log_path)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directives for the given config, before any `RUST_LOG` override.
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Create `log_dir` and return the log file path inside it.
fn prepare_log_file(log_dir: &Path) -> Option<PathBuf> {
    std::fs::create_dir_all(log_dir).ok()?;
    Some(log_dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_filter_without_config_is_default() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_filter_uses_config_level() {
        let mut config = Config::default();
        config.debug.log_level = " debug,tilegen_pipeline=trace ".to_string();
        assert_eq!(
            filter_directives(Some(&config)),
            "debug,tilegen_pipeline=trace"
        );
    }

    #[test]
    fn test_empty_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,tilegen_pipeline=trace",
            "warn,tilegen_terrain=debug,tilegen_mesh=trace",
            "error",
        ];

        for filter_str in &valid_filters {
            let result = EnvFilter::try_new(filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {filter_str}");
        }
    }

    #[test]
    fn test_prepare_log_file_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");

        let path = prepare_log_file(&log_dir).unwrap();
        assert!(log_dir.is_dir(), "log directory should be created");
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
    }

    #[test]
    fn test_prepare_log_file_fails_under_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        assert!(prepare_log_file(&blocker.join("logs")).is_none());
    }
}
