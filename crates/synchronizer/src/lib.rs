//! Synchronization engine: follows the rollup contract on L1, derives the
//! set of sequenced-but-unfetched batch payloads and drives their
//! resolution.

mod error;
pub use error::{SynchronizerError, SynchronizerResult};

mod metrics;
pub use metrics::SynchronizerMetrics;

mod resolver;
pub use resolver::Resolver;

mod store;

use std::{sync::Arc, time::Duration};

use alloy_primitives::B256;
use da_node_db::Database;
use da_node_l1::{abi, L1Client};
use da_node_primitives::BatchKey;
use tokio_util::sync::CancellationToken;

/// Configuration for the batch synchronizer.
#[derive(Debug, Clone, Copy)]
pub struct SynchronizerConfig {
    /// The L1 block the first boot starts from.
    pub genesis_block: u64,
    /// The maximum number of blocks processed per step.
    pub block_batch_size: u64,
    /// The number of blocks behind the head considered stable.
    pub confirmation_depth: u64,
    /// The number of blocks rewound when a reorg is detected.
    pub reorg_window: u64,
    /// The maximum number of unresolved keys handed to the resolver per
    /// cycle.
    pub resolve_batch_limit: u64,
    /// The pause between steps once synced to the stable head.
    pub sync_interval: Duration,
}

/// Block-paced state machine advancing the L1 cursor and feeding the
/// resolver.
///
/// Each step filters `SequenceBatches` events in the next block range,
/// decodes the committed batch digests out of the sequencing calldata,
/// records them as unresolved keys atomically with the cursor advance, and
/// then hands a bounded slice of the unresolved set to the [`Resolver`].
pub struct BatchSynchronizer {
    db: Arc<Database>,
    client: Arc<dyn L1Client>,
    resolver: Resolver,
    config: SynchronizerConfig,
    /// The last block whose events were recorded.
    last_processed_block: u64,
    /// The hash of the cursor block header, retained for reorg detection.
    last_processed_hash: Option<B256>,
    metrics: SynchronizerMetrics,
}

impl BatchSynchronizer {
    /// Creates the synchronizer, seeding the cursor from the store or the
    /// configured genesis block.
    pub async fn new(
        db: Arc<Database>,
        client: Arc<dyn L1Client>,
        resolver: Resolver,
        config: SynchronizerConfig,
    ) -> SynchronizerResult<Self> {
        let last_processed_block = match store::get_start_block(&db).await? {
            Some(block) => block,
            None => {
                tracing::info!(
                    target: "danode::synchronizer",
                    genesis = config.genesis_block,
                    "no sync cursor found, starting from genesis block"
                );
                config.genesis_block
            }
        };

        Ok(Self {
            db,
            client,
            resolver,
            config,
            last_processed_block,
            last_processed_hash: None,
            metrics: SynchronizerMetrics::default(),
        })
    }

    /// Main loop. Steps until cancellation, pausing once synced to the
    /// stable head.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            let advanced = match self.step().await {
                Ok(advanced) => advanced,
                Err(err) => {
                    // transient failures leave the cursor untouched; retry on
                    // the next tick.
                    tracing::error!(target: "danode::synchronizer", ?err, "synchronization step failed");
                    false
                }
            };

            if cancel.is_cancelled() {
                break;
            }
            if !advanced {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.config.sync_interval) => {}
                }
            }
        }
        tracing::info!(target: "danode::synchronizer", "batch synchronizer stopped");
    }

    /// One follow-and-resolve cycle. Returns whether the cursor advanced.
    pub async fn step(&mut self) -> SynchronizerResult<bool> {
        let advanced = self.follow().await?;
        self.resolve().await?;
        Ok(advanced)
    }

    /// Advances the cursor by at most one block range, recording the batch
    /// keys committed in it.
    async fn follow(&mut self) -> SynchronizerResult<bool> {
        // rewind first if the retained cursor header left the canonical
        // chain.
        if self.detect_reorg().await? {
            return Ok(true);
        }

        let head = self.client.latest_block_number().await?;
        let stable_head = head.saturating_sub(self.config.confirmation_depth);
        let from = self.last_processed_block + 1;
        let to = stable_head.min(self.last_processed_block.saturating_add(self.config.block_batch_size));
        if to < from {
            return Ok(false);
        }

        let keys = self.discover_batch_keys(from, to).await?;
        if !keys.is_empty() {
            tracing::info!(
                target: "danode::synchronizer",
                from,
                to,
                count = keys.len(),
                "discovered sequenced batches"
            );
            self.metrics.discovered_batches.increment(keys.len() as u64);
        }

        // fetch the header first so the retained hash always describes the
        // committed cursor.
        let header = self.client.header_by_number(to).await?;
        store::store_discovered(&self.db, &keys, to).await?;

        self.last_processed_block = to;
        self.last_processed_hash = Some(header.hash);
        self.metrics.last_processed_block.set(to as f64);
        Ok(true)
    }

    /// Checks the retained cursor header against the canonical chain,
    /// rewinding the cursor on mismatch.
    async fn detect_reorg(&mut self) -> SynchronizerResult<bool> {
        let Some(retained) = self.last_processed_hash else { return Ok(false) };

        let header = self.client.header_by_number(self.last_processed_block).await?;
        if header.hash == retained {
            return Ok(false);
        }

        let rewound = self.last_processed_block.saturating_sub(self.config.reorg_window);
        tracing::warn!(
            target: "danode::synchronizer",
            from = self.last_processed_block,
            to = rewound,
            "reorg detected, rewinding cursor"
        );
        self.metrics.reorgs.increment(1);

        store::set_start_block(&self.db, rewound).await?;
        self.last_processed_block = rewound;
        self.last_processed_hash = None;
        Ok(true)
    }

    /// Extracts the batch keys committed in the block range from
    /// `SequenceBatches` events, filtering out payloads already stored.
    async fn discover_batch_keys(
        &self,
        from: u64,
        to: u64,
    ) -> SynchronizerResult<Vec<BatchKey>> {
        let events = self.client.filter_sequence_batches(from, to).await?;

        let mut keys = Vec::new();
        for event in &events {
            let input = self.client.transaction_input(event.tx_hash).await?;
            let Some(batches) = abi::try_decode_sequence_batches(&input) else {
                tracing::warn!(
                    target: "danode::synchronizer",
                    tx = %event.tx_hash,
                    "sequencing transaction calldata did not decode, skipping"
                );
                continue;
            };

            // batch numbers count backwards from the event's final batch
            // number.
            let count = batches.len() as u64;
            for (i, batch) in batches.iter().enumerate() {
                let number = event.batch_num - count + i as u64 + 1;
                keys.push(BatchKey { number, hash: batch.transactionsHash });
            }
        }

        let mut new_keys = Vec::with_capacity(keys.len());
        for key in keys {
            if !store::exists(&self.db, key.hash).await {
                new_keys.push(key);
            }
        }
        Ok(new_keys)
    }

    /// Hands a bounded slice of the unresolved set to the resolver.
    async fn resolve(&self) -> SynchronizerResult<()> {
        let unresolved =
            store::get_unresolved_batch_keys(&self.db, self.config.resolve_batch_limit).await?;
        if unresolved.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            target: "danode::synchronizer",
            count = unresolved.len(),
            "resolving batch keys"
        );
        let resolved = self.resolver.resolve(&unresolved).await?;
        if resolved > 0 {
            self.metrics.resolved_batches.increment(resolved as u64);
        }
        Ok(())
    }
}
