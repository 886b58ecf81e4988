use crate::{store, SynchronizerResult};

use std::{collections::HashSet, sync::Arc};

use alloy_primitives::{keccak256, Address};
use da_node_db::Database;
use da_node_l1::L1Client;
use da_node_primitives::{BatchKey, CommitteeMember, OffChainData};
use da_node_rpc::PeerClient;
use da_node_sequencer::SequencerTracker;
use rand::seq::SliceRandom;

/// Resolves unresolved batch keys by fetching their payloads from committee
/// members or the trusted sequencer and verifying them against the on-chain
/// hash.
pub struct Resolver {
    db: Arc<Database>,
    client: Arc<dyn L1Client>,
    peers: Arc<dyn PeerClient>,
    tracker: Arc<SequencerTracker>,
    /// This node's own committee address, excluded from the member snapshot.
    self_addr: Address,
}

impl Resolver {
    /// Creates a new resolver.
    pub fn new(
        db: Arc<Database>,
        client: Arc<dyn L1Client>,
        peers: Arc<dyn PeerClient>,
        tracker: Arc<SequencerTracker>,
        self_addr: Address,
    ) -> Self {
        Self { db, client, peers, tracker, self_addr }
    }

    /// Attempts to resolve the given keys, returning how many were stored.
    ///
    /// Keys with no healthy source are left unresolved for the next cycle;
    /// only store failures propagate.
    pub async fn resolve(&self, unresolved: &[BatchKey]) -> SynchronizerResult<usize> {
        if unresolved.is_empty() {
            return Ok(0);
        }

        // dedup by payload hash, first occurrence wins.
        let mut seen = HashSet::new();
        let keys: Vec<BatchKey> =
            unresolved.iter().copied().filter(|key| seen.insert(key.hash)).collect();

        // snapshot the committee, excluding ourselves.
        let committee = self.client.current_committee().await?;
        let mut members: Vec<CommitteeMember> = committee
            .members
            .into_iter()
            .filter(|member| member.addr != self.self_addr)
            .collect();

        let mut resolved = Vec::new();
        let mut resolved_keys = Vec::new();
        for key in keys {
            if store::exists(&self.db, key.hash).await {
                continue;
            }
            match self.fetch(&mut members, key).await {
                Some(data) => {
                    resolved_keys.push(key);
                    resolved.push(data);
                }
                None => tracing::warn!(
                    target: "danode::synchronizer",
                    batch = key.number,
                    hash = %key.hash,
                    "no source provided a valid payload, leaving key unresolved"
                ),
            }
        }

        if resolved.is_empty() {
            return Ok(0);
        }

        store::store_resolved(&self.db, &resolved, &resolved_keys).await?;
        Ok(resolved.len())
    }

    /// Tries each committee member in randomized order, then falls back to
    /// the trusted sequencer. Every response is verified against the key's
    /// hash before it is accepted.
    async fn fetch(&self, members: &mut [CommitteeMember], key: BatchKey) -> Option<OffChainData> {
        members.shuffle(&mut rand::rng());

        for member in members.iter() {
            match self.peers.get_off_chain_data(&member.url, key.hash).await {
                Ok(value) if keccak256(&value) == key.hash => {
                    tracing::debug!(
                        target: "danode::synchronizer",
                        batch = key.number,
                        url = %member.url,
                        "resolved batch payload from committee member"
                    );
                    return Some(OffChainData { key: key.hash, value, batch_num: key.number });
                }
                Ok(_) => tracing::warn!(
                    target: "danode::synchronizer",
                    url = %member.url,
                    hash = %key.hash,
                    "committee member returned payload with mismatched hash"
                ),
                Err(err) => tracing::debug!(
                    target: "danode::synchronizer",
                    url = %member.url,
                    ?err,
                    "failed to fetch offchain data from committee member"
                ),
            }
        }

        // no member had it, fall back to the trusted sequencer.
        let url = self.tracker.url();
        match self.peers.get_sequence_batch(&url, key.number).await {
            Ok(batch) if keccak256(&batch.batch_l2_data) == key.hash => {
                tracing::debug!(
                    target: "danode::synchronizer",
                    batch = key.number,
                    "resolved batch payload from the trusted sequencer"
                );
                Some(OffChainData {
                    key: key.hash,
                    value: batch.batch_l2_data,
                    batch_num: key.number,
                })
            }
            Ok(_) => {
                tracing::warn!(
                    target: "danode::synchronizer",
                    hash = %key.hash,
                    "trusted sequencer returned payload with mismatched hash"
                );
                None
            }
            Err(err) => {
                tracing::debug!(
                    target: "danode::synchronizer",
                    url = %url,
                    ?err,
                    "failed to fetch batch from the trusted sequencer"
                );
                None
            }
        }
    }
}
