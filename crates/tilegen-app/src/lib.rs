//! Tile generator application: config loading, the consumer tick loop and
//! preview export.

pub mod export;
pub mod platform;
pub mod session;
pub mod tick_loop;

use std::path::PathBuf;
use std::time::Duration;

use tilegen_config::{CliArgs, Config, ConfigError};
use tilegen_pipeline::{DrawMode, MapGenerator};

use crate::export::{ExportError, write_preview};
use crate::platform::{AppDirs, PlatformError};
use crate::session::{Session, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Resolve directories, load `config.ron` (creating it on first run), and
/// apply the command-line overrides.
pub fn load_config(args: &CliArgs) -> Result<(AppDirs, Config), AppError> {
    let dirs = AppDirs::resolve_with_override(args.config.as_deref())?;
    dirs.create_dirs()?;
    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    Ok((dirs, config))
}

/// Generate one tile as configured and write its preview images.
pub fn generate(config: &Config) -> Result<Vec<PathBuf>, AppError> {
    let generator = MapGenerator::new(
        &config.pipeline,
        config.regions.clone(),
        config.mesh.clone(),
    );
    let mut session = Session::new(generator, config.output.draw_mode);
    let preview = session.run(
        config.noise.clone(),
        config.output.tick_rate_hz,
        Duration::from_secs(u64::from(config.output.timeout_seconds)),
    )?;

    let stem = format!(
        "tile_{}_{}",
        config.noise.seed,
        mode_name(config.output.draw_mode)
    );
    Ok(write_preview(&preview, &config.output.directory, &stem)?)
}

fn mode_name(mode: DrawMode) -> &'static str {
    match mode {
        DrawMode::NoiseMap => "noise",
        DrawMode::ColorMap => "color",
        DrawMode::Mesh => "mesh",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_mesh::LevelOfDetail;

    #[test]
    fn test_load_config_uses_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            config: Some(dir.path().to_path_buf()),
            seed: Some(9),
            ..Default::default()
        };

        let (dirs, config) = load_config(&args).unwrap();
        assert_eq!(dirs.config_dir, dir.path());
        assert!(dir.path().join("config.ron").exists());
        assert_eq!(config.noise.seed, 9);
    }

    #[test]
    fn test_cli_override_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            config: Some(dir.path().to_path_buf()),
            seed: Some(9),
            ..Default::default()
        };
        load_config(&args).unwrap();

        let on_disk = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(on_disk.noise.seed, Config::default().noise.seed);
    }

    #[test]
    fn test_generate_writes_named_previews() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.noise.seed = 5;
        config.mesh.level_of_detail = LevelOfDetail::MAX;
        config.output.draw_mode = DrawMode::Mesh;
        config.output.directory = dir.path().join("out");
        config.output.tick_rate_hz = 120;

        let written = generate(&config).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("out").join("tile_5_mesh.png"),
                dir.path().join("out").join("tile_5_mesh_shaded.png"),
            ]
        );
        assert!(written.iter().all(|path| path.exists()));
    }
}
