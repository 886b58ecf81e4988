use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics for the [`super::BatchSynchronizer`].
#[derive(Metrics)]
#[metrics(scope = "synchronizer")]
pub struct SynchronizerMetrics {
    /// A counter on the sequenced batch keys discovered.
    pub discovered_batches: Counter,
    /// A counter on the batch payloads resolved and stored.
    pub resolved_batches: Counter,
    /// A counter on the reorgs detected.
    pub reorgs: Counter,
    /// The last L1 block processed.
    pub last_processed_block: Gauge,
}
