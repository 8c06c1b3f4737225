use thiserror::Error;

/// Fatal error kinds of the sampler. There is no local recovery: every
/// variant terminates the run on all workers.
#[derive(Debug, Error)]
pub enum WlError {
    /// Rejected run parameters (window/overlap constraints, worker counts,
    /// malformed scalar options). Surfaced once as a banner on the root.
    #[error("configuration error: {0}")]
    Config(String),

    /// The overlap between two adjacent windows contained no position where
    /// both DoS estimates exceed the qualification threshold, so no shift
    /// can be derived.
    #[error("stitch failed for window {window}: no overlap bin above {min_val:e}")]
    Stitch { window: usize, min_val: f64 },

    /// Inter-worker messaging failed (peer gone, channel closed).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The flatness criterion was never met within the configured batch cap.
    #[error("flatness criterion not met after {batches} sweep batches")]
    Unconverged { batches: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
