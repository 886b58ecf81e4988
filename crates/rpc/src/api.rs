use std::collections::HashMap;

use alloy_primitives::{Bytes, B256, U64};
use da_node_primitives::{SeqBatch, SignedSequence};
use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use serde::{Deserialize, Serialize};

/// The node status reported by [`DataAvailabilityApiServer::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// The current L1 head block.
    #[serde(with = "alloy_serde::quantity")]
    pub current_block: u64,
    /// The last L1 block processed by the synchronizer.
    #[serde(with = "alloy_serde::quantity")]
    pub last_processed_block: u64,
    /// The number of off-chain payloads stored.
    #[serde(with = "alloy_serde::quantity")]
    pub off_chain_data_count: u64,
    /// The node software version.
    pub version: String,
    /// Seconds since the node started.
    #[serde(with = "alloy_serde::quantity")]
    pub uptime_secs: u64,
}

/// The public API of a data availability committee node.
#[rpc(server, client)]
pub trait DataAvailabilityApi {
    /// Returns the synchronization status of the node.
    #[method(name = "status")]
    async fn status(&self) -> RpcResult<StatusResponse>;

    /// Verifies and persists a sequence received from the trusted sequencer,
    /// returning the node's signature over its accumulated input hash.
    #[method(name = "signSequence")]
    async fn sign_sequence(&self, signed_sequence: SignedSequence) -> RpcResult<Bytes>;

    /// Returns the payload whose Keccak-256 digest is the given hash.
    #[method(name = "getOffChainData")]
    async fn get_off_chain_data(&self, hash: B256) -> RpcResult<Bytes>;

    /// Returns the payloads for all the given hashes. The call fails if any
    /// of them is missing.
    #[method(name = "listOffChainData")]
    async fn list_off_chain_data(&self, hashes: Vec<B256>) -> RpcResult<HashMap<B256, Bytes>>;
}

/// The slice of the trusted sequencer's RPC the node consumes.
#[rpc(client)]
pub trait SequencerApi {
    /// Returns the batch with the given number.
    #[method(name = "zkevm_getBatchByNumber")]
    async fn get_batch_by_number(
        &self,
        batch_number: U64,
        include_transactions: bool,
    ) -> RpcResult<SeqBatch>;
}
