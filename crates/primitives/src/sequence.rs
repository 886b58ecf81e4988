use crate::OffChainData;

use alloy_primitives::{keccak256, Address, Bytes, Signature, B256};
use serde::{Deserialize, Serialize};

/// The length of a wire-format ECDSA signature: `r || s || v` with `v` in
/// `{27, 28}`.
pub const SIGNATURE_LENGTH: usize = 65;

/// A single batch within a sequence submitted by the trusted sequencer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// The raw batch payload.
    #[serde(rename = "L2Data")]
    pub l2_data: Bytes,
    /// The forced global exit root, non-zero only for forced batches.
    #[serde(rename = "forcedGlobalExitRoot")]
    pub forced_global_exit_root: B256,
    /// The forced timestamp. A non-zero value marks the batch as forced.
    #[serde(rename = "forcedTimestamp", with = "alloy_serde::quantity")]
    pub forced_timestamp: u64,
    /// The coinbase rewarded for the batch.
    #[serde(rename = "coinbase")]
    pub coinbase: Address,
    /// The L1 block hash bound to a forced batch.
    #[serde(rename = "forcedBlockHashL1")]
    pub forced_block_hash_l1: B256,
}

/// An ordered list of batches plus the metadata folded into the accumulated
/// input hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// The ordered batches of the sequence.
    #[serde(rename = "batches")]
    pub batches: Vec<Batch>,
    /// The accumulated input hash before this sequence.
    #[serde(rename = "oldAccInputhash")]
    pub old_acc_input_hash: B256,
    /// The L1 info tree root covering the sequence.
    #[serde(rename = "l1InfoRoot")]
    pub l1_info_root: B256,
    /// The upper bound on the sequence's block timestamps.
    #[serde(rename = "maxSequenceTimestamp", with = "alloy_serde::quantity")]
    pub max_sequence_timestamp: u64,
}

impl Sequence {
    /// Returns the accumulated input hash of the sequence, the message the
    /// sequencer signs. Matches the fold performed by the rollup contract.
    pub fn hash_to_sign(&self) -> B256 {
        let mut acc = self.old_acc_input_hash;
        for batch in &self.batches {
            let transactions_hash = keccak256(&batch.l2_data);
            acc = if batch.forced_timestamp > 0 {
                accumulate_input_hash(
                    acc,
                    transactions_hash,
                    batch.forced_global_exit_root,
                    batch.forced_timestamp,
                    batch.coinbase,
                    batch.forced_block_hash_l1,
                )
            } else {
                accumulate_input_hash(
                    acc,
                    transactions_hash,
                    self.l1_info_root,
                    self.max_sequence_timestamp,
                    batch.coinbase,
                    B256::ZERO,
                )
            };
        }
        acc
    }

    /// Returns the off-chain rows derived from the sequence payloads.
    ///
    /// The wire format carries no batch numbers, so the rows are stored with
    /// a zero batch number until the batches are observed on L1.
    pub fn off_chain_data(&self) -> Vec<OffChainData> {
        self.batches.iter().map(|batch| OffChainData::new(batch.l2_data.clone(), 0)).collect()
    }
}

/// One step of the accumulated input hash: the tight-packed Keccak-256 the
/// rollup contract applies per batch.
fn accumulate_input_hash(
    acc: B256,
    transactions_hash: B256,
    exit_root_or_info_root: B256,
    timestamp: u64,
    coinbase: Address,
    forced_block_hash: B256,
) -> B256 {
    let mut buf = Vec::with_capacity(156);
    buf.extend_from_slice(acc.as_slice());
    buf.extend_from_slice(transactions_hash.as_slice());
    buf.extend_from_slice(exit_root_or_info_root.as_slice());
    buf.extend_from_slice(&timestamp.to_be_bytes());
    buf.extend_from_slice(coinbase.as_slice());
    buf.extend_from_slice(forced_block_hash.as_slice());
    keccak256(&buf)
}

/// A sequence along with the sequencer's signature over its accumulated
/// input hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedSequence {
    /// The signed sequence.
    #[serde(rename = "sequence")]
    pub sequence: Sequence,
    /// The 65-byte signature over [`Sequence::hash_to_sign`].
    #[serde(rename = "signature")]
    pub signature: Bytes,
}

impl SignedSequence {
    /// Recovers the address that signed the sequence.
    pub fn signer(&self) -> Result<Address, SequenceError> {
        if self.signature.len() != SIGNATURE_LENGTH {
            return Err(SequenceError::InvalidSignatureLength(self.signature.len()));
        }
        let signature = Signature::from_raw(&self.signature)?;
        Ok(signature.recover_address_from_prehash(&self.sequence.hash_to_sign())?)
    }
}

/// An error raised while recovering the signer of a sequence.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The signature does not have the expected 65-byte length.
    #[error("invalid signature length {0}, expected {SIGNATURE_LENGTH}")]
    InvalidSignatureLength(usize),
    /// The signature failed to parse or recover.
    #[error("invalid signature: {0}")]
    Signature(#[from] alloy_primitives::SignatureError),
}
