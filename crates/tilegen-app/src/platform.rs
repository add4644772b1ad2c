//! Per-user directories for config, logs and generated previews.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while resolving or creating app directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// A directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

const APP_NAME: &str = "tilegen";

/// Directories the generator reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// JSON log files.
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// Resolve the OS locations without creating anything.
    ///
    /// Logs go to the OS data directory when there is one, otherwise next to
    /// the config.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_dir = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let log_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| config_dir.clone())
            .join("logs");
        Ok(Self {
            config_dir,
            log_dir,
        })
    }

    /// Resolve directories, using `config_override` as the config directory
    /// when given. Logs then live under it as well.
    pub fn resolve_with_override(config_override: Option<&Path>) -> Result<Self, PlatformError> {
        match config_override {
            Some(dir) => Ok(Self::resolve_with_root(dir)),
            None => Self::resolve(),
        }
    }

    /// Directories rooted under `root`, for tests and portable installs.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }

    /// Create every directory on disk.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PlatformError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
