//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tilegen_mesh::MeshSettings;
use tilegen_pipeline::{DrawMode, GeneratorOptions};
use tilegen_terrain::{NoiseParams, RegionTable};

use crate::error::ConfigError;

/// Top-level generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fractal noise settings.
    pub noise: NoiseParams,
    /// Height-to-color regions, lowest first.
    pub regions: RegionTable,
    /// Mesh height scale, remap curve and level of detail.
    pub mesh: MeshSettings,
    /// Worker pool sizing.
    pub pipeline: GeneratorOptions,
    /// What to produce and where to put it.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            regions: RegionTable::default_terrain(),
            mesh: MeshSettings::default(),
            pipeline: GeneratorOptions::default(),
            output: OutputConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Which preview to produce.
    pub draw_mode: DrawMode,
    /// Directory preview images are written to.
    pub directory: PathBuf,
    /// Consumer ticks per second.
    pub tick_rate_hz: u32,
    /// Give up waiting for results after this many seconds.
    pub timeout_seconds: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            draw_mode: DrawMode::ColorMap,
            directory: PathBuf::from("output"),
            tick_rate_hz: 60,
            timeout_seconds: 30,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

// --- Validation ---

impl Config {
    /// Clamp every out-of-range value to the nearest valid one.
    ///
    /// Bad values are corrected, never rejected. A region table with
    /// descending thresholds is kept as is and only reported.
    pub fn sanitize(&mut self) {
        let noise = self.noise.sanitized();
        if noise != self.noise {
            log::warn!("Noise settings out of range, clamped");
            self.noise = noise;
        }
        if self.output.tick_rate_hz == 0 {
            log::warn!("tick_rate_hz must be positive, using 1");
            self.output.tick_rate_hz = 1;
        }
        if self.pipeline.queue_capacity == 0 {
            log::warn!("queue_capacity must be positive, using 1");
            self.pipeline.queue_capacity = 1;
        }
        if let Err(err) = self.regions.validate() {
            log::warn!("Region table is not ordered by height: {err}");
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Default config directory for this user, if the OS provides one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tilegen"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let mut config = Self::read_file(&config_path)?;
            config.sanitize();
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join("config.ron");
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    fn read_file(config_path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let mut new_config = Self::read_file(&config_path)?;
        new_config.sanitize();

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
