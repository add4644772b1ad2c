//! Asynchronous map generation on a fixed worker pool.
//!
//! Requests are queued on a bounded channel and picked up by worker threads.
//! Each finished job is paired with its callback and sent back on one of two
//! result channels (height, mesh). The consumer thread calls
//! [`MapGenerator::drain`] once per tick to run those callbacks; nothing on
//! the consumer side ever waits for a worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use serde::{Deserialize, Serialize};
use tilegen_mesh::{MeshBuffers, MeshSettings, build_with_settings};
use tilegen_terrain::{HeightField, NoiseParams, RegionTable};
use tracing::{debug, error, info, trace, warn};

use crate::error::PipelineError;
use crate::map_data::{MapData, generate_map_data};
use crate::preview::{DrawMode, Preview, draw_preview};

type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// A finished payload waiting for the consumer to run its callback.
pub struct PendingResult<T> {
    callback: Callback<T>,
    payload: T,
}

impl<T> PendingResult<T> {
    fn deliver(self) {
        (self.callback)(self.payload);
    }
}

enum Job {
    Height {
        params: NoiseParams,
        regions: Arc<RegionTable>,
        callback: Callback<MapData>,
    },
    Mesh {
        height_field: Arc<HeightField>,
        settings: Arc<MeshSettings>,
        callback: Callback<MeshBuffers>,
    },
}

/// Worker pool sizing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Worker threads. 0 picks `num_cpus - 2`, at least 1.
    pub worker_count: usize,
    /// Jobs that may wait in the queue before requests are rejected.
    pub queue_capacity: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            worker_count: 0,
            queue_capacity: 64,
        }
    }
}

impl GeneratorOptions {
    /// Worker count with the automatic default resolved.
    pub fn resolved_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            self.worker_count
        } else {
            num_cpus::get().saturating_sub(2).max(1)
        }
    }
}

/// Callbacks run by one [`MapGenerator::drain`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Height callbacks run.
    pub height_delivered: usize,
    /// Mesh callbacks run.
    pub mesh_delivered: usize,
}

impl DrainStats {
    /// Callbacks run of either kind.
    pub fn total(&self) -> usize {
        self.height_delivered + self.mesh_delivered
    }
}

/// Asynchronous height and mesh generation for map tiles.
///
/// Region table and mesh settings are snapshotted when a request is made, so
/// changing them never affects work already queued.
pub struct MapGenerator {
    job_sender: Option<Sender<Job>>,
    height_results: Receiver<PendingResult<MapData>>,
    mesh_results: Receiver<PendingResult<MeshBuffers>>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
    draining: AtomicBool,
    queue_capacity: usize,
    regions: Arc<RegionTable>,
    mesh_settings: Arc<MeshSettings>,
}

impl MapGenerator {
    /// Start the worker pool.
    pub fn new(
        options: &GeneratorOptions,
        regions: RegionTable,
        mesh_settings: MeshSettings,
    ) -> Self {
        let worker_count = options.resolved_worker_count();
        let queue_capacity = options.queue_capacity.max(1);

        let (job_tx, job_rx) = bounded::<Job>(queue_capacity);
        let (height_tx, height_rx) = unbounded();
        let (mesh_tx, mesh_rx) = unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let jobs = job_rx.clone();
            let height_tx = height_tx.clone();
            let mesh_tx = mesh_tx.clone();
            let in_flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("map-gen-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = jobs.recv() {
                        run_job(job, &height_tx, &mesh_tx);
                        in_flight.fetch_sub(1, Ordering::Release);
                    }
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => warn!(index, %err, "failed to spawn map generation worker"),
            }
        }

        if workers.is_empty() {
            error!(worker_count, "no map generation worker could be started");
        } else {
            info!(
                workers = workers.len(),
                queue_capacity, "map generator started"
            );
        }

        Self {
            job_sender: Some(job_tx),
            height_results: height_rx,
            mesh_results: mesh_rx,
            workers,
            in_flight,
            draining: AtomicBool::new(false),
            queue_capacity,
            regions: Arc::new(regions),
            mesh_settings: Arc::new(mesh_settings),
        }
    }

    /// Generator with default pool sizing.
    pub fn with_defaults(regions: RegionTable, mesh_settings: MeshSettings) -> Self {
        Self::new(&GeneratorOptions::default(), regions, mesh_settings)
    }

    /// Queue a height field + region classification job.
    ///
    /// Returns immediately. On success `callback` runs exactly once, on the
    /// thread that calls [`drain`](Self::drain), after the job completes.
    pub fn request_height_data(
        &self,
        params: NoiseParams,
        callback: impl FnOnce(MapData) + Send + 'static,
    ) -> Result<(), PipelineError> {
        self.submit(Job::Height {
            params,
            regions: Arc::clone(&self.regions),
            callback: Box::new(callback),
        })
    }

    /// Queue a mesh job for a previously generated tile.
    ///
    /// Reuses `map_data`'s height field; nothing is regenerated.
    pub fn request_mesh_data(
        &self,
        map_data: &MapData,
        callback: impl FnOnce(MeshBuffers) + Send + 'static,
    ) -> Result<(), PipelineError> {
        self.submit(Job::Mesh {
            height_field: Arc::clone(&map_data.height_field),
            settings: Arc::clone(&self.mesh_settings),
            callback: Box::new(callback),
        })
    }

    fn submit(&self, job: Job) -> Result<(), PipelineError> {
        let sender = self.job_sender.as_ref().ok_or(PipelineError::ShutDown)?;
        if self.workers.is_empty() {
            return Err(PipelineError::NoWorkers);
        }

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        sender.try_send(job).map_err(|err| {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            match err {
                TrySendError::Full(_) => {
                    warn!(capacity = self.queue_capacity, "map generation queue full");
                    PipelineError::Saturated {
                        capacity: self.queue_capacity,
                    }
                }
                TrySendError::Disconnected(_) => PipelineError::ShutDown,
            }
        })
    }

    /// Run the callbacks of every result that was ready when the call began,
    /// in completion order, height results first.
    ///
    /// Call once per tick from the consumer thread. Requests made from inside
    /// a callback are delivered by a later drain. Callbacks must not call
    /// `drain` themselves.
    ///
    /// Results are taken off their queue one at a time, so if a callback
    /// panics the results after it stay queued for the next drain.
    pub fn drain(&self) -> DrainStats {
        let reentered = self.draining.swap(true, Ordering::Acquire);
        debug_assert!(!reentered, "MapGenerator::drain called from a drain callback");
        let _guard = (!reentered).then(|| DrainGuard(&self.draining));

        let ready_heights = self.height_results.len();
        let ready_meshes = self.mesh_results.len();
        let stats = DrainStats {
            height_delivered: deliver_ready(&self.height_results, ready_heights),
            mesh_delivered: deliver_ready(&self.mesh_results, ready_meshes),
        };

        if stats.total() > 0 {
            trace!(
                heights = stats.height_delivered,
                meshes = stats.mesh_delivered,
                "drained map results"
            );
        }
        stats
    }

    /// Jobs queued or executing.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Results completed but not yet drained.
    pub fn ready_count(&self) -> usize {
        self.height_results.len() + self.mesh_results.len()
    }

    /// Block until no job is queued or executing, or `timeout` passes.
    /// Returns `true` if the pool went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight_count() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Replace the region table used by future height requests.
    pub fn set_regions(&mut self, regions: RegionTable) {
        self.regions = Arc::new(regions);
    }

    /// Replace the mesh settings used by future mesh requests.
    pub fn set_mesh_settings(&mut self, settings: MeshSettings) {
        self.mesh_settings = Arc::new(settings);
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn mesh_settings(&self) -> &MeshSettings {
        &self.mesh_settings
    }

    /// Build a preview on the calling thread with the current region table
    /// and mesh settings. Bypasses the worker pool.
    pub fn preview(&self, params: &NoiseParams, mode: DrawMode) -> Preview {
        draw_preview(params, &self.regions, &self.mesh_settings, mode)
    }

    /// Stop accepting requests, let queued jobs finish, and join the workers.
    ///
    /// Results already produced stay available to [`drain`](Self::drain).
    pub fn shutdown(&mut self) {
        if self.job_sender.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        debug!("map generator shut down");
    }
}

impl Drop for MapGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Clears the draining flag even when a callback unwinds.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Deliver up to `ready` results, oldest first. Returns how many ran.
fn deliver_ready<T>(results: &Receiver<PendingResult<T>>, ready: usize) -> usize {
    let mut delivered = 0;
    while delivered < ready {
        let Ok(pending) = results.try_recv() else {
            break;
        };
        pending.deliver();
        delivered += 1;
    }
    delivered
}

fn run_job(
    job: Job,
    height_tx: &Sender<PendingResult<MapData>>,
    mesh_tx: &Sender<PendingResult<MeshBuffers>>,
) {
    let start = Instant::now();
    match job {
        Job::Height {
            params,
            regions,
            callback,
        } => {
            let payload = generate_map_data(&params, &regions);
            trace!(
                seed = params.seed,
                elapsed_us = start.elapsed().as_micros() as u64,
                "height data generated"
            );
            let _ = height_tx.send(PendingResult { callback, payload });
        }
        Job::Mesh {
            height_field,
            settings,
            callback,
        } => {
            let payload = build_with_settings(&height_field, &settings);
            trace!(
                lod = settings.level_of_detail.level(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "mesh data built"
            );
            let _ = mesh_tx.send(PendingResult { callback, payload });
        }
    }
}
