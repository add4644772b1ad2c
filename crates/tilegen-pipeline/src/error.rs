//! Pipeline error types.

/// Why a request was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The job queue is full. The request was not queued and its callback
    /// will never run; retry on a later tick.
    #[error("generation queue is full ({capacity} pending jobs)")]
    Saturated {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// No worker thread could be started, so the request would never run.
    #[error("map generator has no worker threads")]
    NoWorkers,

    /// The generator has been shut down.
    #[error("map generator has been shut down")]
    ShutDown,
}
