use alloy_primitives::{keccak256, Bytes, B256};
use serde::{Deserialize, Serialize};

/// A sequenced batch awaiting resolution: the batch number paired with the
/// Keccak-256 digest of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    /// The batch number assigned on the rollup contract.
    pub number: u64,
    /// The Keccak-256 digest of the batch payload.
    pub hash: B256,
}

/// A batch payload kept outside the L1, keyed by its Keccak-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffChainData {
    /// The Keccak-256 digest of `value`.
    pub key: B256,
    /// The raw batch payload.
    pub value: Bytes,
    /// The batch number the payload belongs to. Zero when unknown.
    pub batch_num: u64,
}

impl OffChainData {
    /// Creates an [`OffChainData`] whose key is derived from the payload.
    pub fn new(value: Bytes, batch_num: u64) -> Self {
        Self { key: keccak256(&value), value, batch_num }
    }

    /// Whether the stored key matches the digest of the payload.
    pub fn verify(&self) -> bool {
        keccak256(&self.value) == self.key
    }
}

/// A batch as served by the trusted sequencer's RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeqBatch {
    /// The batch number.
    #[serde(with = "alloy_serde::quantity")]
    pub number: u64,
    /// The accumulated input hash up to and including this batch.
    pub acc_input_hash: B256,
    /// The raw batch payload.
    pub batch_l2_data: Bytes,
}
