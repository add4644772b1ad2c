//! Command-line argument parsing for the tile generator.

use std::path::PathBuf;

use clap::Parser;
use tilegen_mesh::LevelOfDetail;
use tilegen_pipeline::DrawMode;
use tilegen_terrain::clamp_count;

use crate::Config;

/// Tile generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tilegen", about = "Procedural terrain tile generator")]
pub struct CliArgs {
    /// Noise seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Noise scale; larger zooms in.
    #[arg(long)]
    pub scale: Option<f32>,

    /// Number of noise octaves. Negative values are treated as 0.
    #[arg(long, allow_negative_numbers = true)]
    pub octaves: Option<i64>,

    /// Amplitude falloff between octaves.
    #[arg(long)]
    pub persistence: Option<f32>,

    /// Frequency growth between octaves.
    #[arg(long)]
    pub lacunarity: Option<f32>,

    /// Mesh level of detail (0-6), clamped into range.
    #[arg(long, allow_negative_numbers = true)]
    pub lod: Option<i64>,

    /// Preview to produce: noise, color or mesh.
    #[arg(long, value_parser = parse_draw_mode)]
    pub draw_mode: Option<DrawMode>,

    /// Directory preview images are written to.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Number of generator worker threads (0 = auto).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_draw_mode(value: &str) -> Result<DrawMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "noise" | "noisemap" | "noise-map" => Ok(DrawMode::NoiseMap),
        "color" | "colour" | "colormap" | "color-map" => Ok(DrawMode::ColorMap),
        "mesh" => Ok(DrawMode::Mesh),
        other => Err(format!("unknown draw mode `{other}` (expected noise, color or mesh)")),
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config, then re-sanitize.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(scale) = args.scale {
            self.noise.scale = scale;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = clamp_count(octaves);
        }
        if let Some(persistence) = args.persistence {
            self.noise.persistence = persistence;
        }
        if let Some(lacunarity) = args.lacunarity {
            self.noise.lacunarity = lacunarity;
        }
        if let Some(lod) = args.lod {
            self.mesh.level_of_detail = LevelOfDetail::clamped(lod);
        }
        if let Some(mode) = args.draw_mode {
            self.output.draw_mode = mode;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(workers) = args.workers {
            self.pipeline.worker_count = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        self.sanitize();
    }
}
