//! One generation run: request a tile, drain results on a fixed tick, and
//! assemble the preview for the configured draw mode.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tilegen_mesh::MeshBuffers;
use tilegen_pipeline::{DrawMode, MapData, MapGenerator, PipelineError, Preview, render_preview};
use tilegen_terrain::{NoiseParams, texture_from_color_map};
use tracing::{debug, info};

use crate::tick_loop::TickLoop;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("no preview after {0:?}")]
    TimedOut(Duration),
}

/// Results handed from drain callbacks back to the session.
enum Produced {
    Map(MapData),
    Mesh(MeshBuffers),
}

/// Drives a [`MapGenerator`] from the consumer side.
///
/// Height results arrive first. In [`DrawMode::Mesh`] each one triggers a
/// mesh request for the same tile, and the preview is ready once that mesh
/// comes back.
pub struct Session {
    generator: MapGenerator,
    mode: DrawMode,
    produced_tx: Sender<Produced>,
    produced_rx: Receiver<Produced>,
    map: Option<MapData>,
    preview: Option<Preview>,
}

impl Session {
    pub fn new(generator: MapGenerator, mode: DrawMode) -> Self {
        let (produced_tx, produced_rx) = unbounded();
        Self {
            generator,
            mode,
            produced_tx,
            produced_rx,
            map: None,
            preview: None,
        }
    }

    /// Queue the height request for `params`.
    pub fn start(&mut self, params: NoiseParams) -> Result<(), PipelineError> {
        let tx = self.produced_tx.clone();
        info!(seed = params.seed, mode = ?self.mode, "requesting tile");
        self.generator.request_height_data(params, move |data| {
            let _ = tx.send(Produced::Map(data));
        })
    }

    /// One consumer tick: run ready callbacks, then react to what they produced.
    pub fn on_tick(&mut self) -> Result<(), PipelineError> {
        let stats = self.generator.drain();
        if stats.total() > 0 {
            debug!(
                heights = stats.height_delivered,
                meshes = stats.mesh_delivered,
                "drained results"
            );
        }

        while let Ok(produced) = self.produced_rx.try_recv() {
            match produced {
                Produced::Map(data) => self.on_map_data(data)?,
                Produced::Mesh(mesh) => self.on_mesh(mesh),
            }
        }
        Ok(())
    }

    fn on_map_data(&mut self, data: MapData) -> Result<(), PipelineError> {
        if self.mode == DrawMode::Mesh {
            let tx = self.produced_tx.clone();
            self.generator.request_mesh_data(&data, move |mesh| {
                let _ = tx.send(Produced::Mesh(mesh));
            })?;
        } else {
            self.preview = Some(render_preview(
                &data,
                self.generator.mesh_settings(),
                self.mode,
            ));
        }
        self.map = Some(data);
        Ok(())
    }

    fn on_mesh(&mut self, mesh: MeshBuffers) {
        let Some(map) = &self.map else {
            return;
        };
        let (width, height) = map.height_field.dimensions();
        self.preview = Some(Preview::Mesh {
            mesh,
            texture: texture_from_color_map(&map.color_map, width as u32, height as u32),
        });
    }

    /// The finished preview, if it is ready.
    pub fn take_preview(&mut self) -> Option<Preview> {
        self.preview.take()
    }

    /// Request a tile and tick at `tick_rate_hz` until its preview is ready.
    pub fn run(
        &mut self,
        params: NoiseParams,
        tick_rate_hz: u32,
        timeout: Duration,
    ) -> Result<Preview, SessionError> {
        let started = Instant::now();
        self.start(params)?;

        let mut tick_loop = TickLoop::new(tick_rate_hz);
        loop {
            let mut result = Ok(());
            tick_loop.tick(|_| {
                if result.is_ok() {
                    result = self.on_tick();
                }
            });
            result?;

            if let Some(preview) = self.take_preview() {
                info!(
                    ticks = tick_loop.tick_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "preview ready"
                );
                return Ok(preview);
            }
            if started.elapsed() >= timeout {
                return Err(SessionError::TimedOut(timeout));
            }
            std::thread::sleep(tick_loop.time_until_next_tick());
        }
    }
}
