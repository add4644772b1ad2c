//! Off-thread terrain tile production.
//!
//! [`MapGenerator`] runs height and mesh generation on a worker pool and hands
//! finished results back through per-type queues that a single consumer
//! drains once per tick.

mod error;
mod generator;
mod map_data;
mod preview;

pub use error::PipelineError;
pub use generator::{DrainStats, GeneratorOptions, MapGenerator, PendingResult};
pub use map_data::{MapData, generate_map_data};
pub use preview::{DrawMode, Preview, draw_preview, render_preview};
