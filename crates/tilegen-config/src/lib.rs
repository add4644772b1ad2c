//! Configuration for the terrain tile generator.
//!
//! Settings persist to disk as RON. Every section defaults when missing, so
//! older files keep loading, and command-line flags override what was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, OutputConfig};
pub use error::ConfigError;
