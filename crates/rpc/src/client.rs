use crate::api::{DataAvailabilityApiClient, SequencerApiClient};

use std::{collections::HashMap, time::Duration};

use alloy_primitives::{Bytes, B256, U64};
use da_node_primitives::SeqBatch;
use jsonrpsee::{
    core::ClientError,
    http_client::{HttpClient, HttpClientBuilder},
};

/// A [`Result`] that uses [`PeerClientError`] as the error type.
pub type PeerResult<T> = Result<T, PeerClientError>;

/// An error raised while calling a committee peer or the trusted sequencer.
#[derive(Debug, thiserror::Error)]
pub enum PeerClientError {
    /// No client could be built for the peer URL.
    #[error("failed to build client for {url}: {source}")]
    Client {
        /// The offending URL.
        url: String,
        /// The underlying builder error.
        #[source]
        source: ClientError,
    },
    /// The call itself failed.
    #[error("rpc call error: {0}")]
    Call(#[from] ClientError),
}

/// JSON-RPC client to other committee members and to the trusted sequencer.
///
/// Calls are bounded by the configured request timeout; retries are owned by
/// the caller.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait::async_trait]
pub trait PeerClient: Send + Sync {
    /// Fetches a single payload by hash from a committee member.
    async fn get_off_chain_data(&self, url: &str, hash: B256) -> PeerResult<Bytes>;

    /// Fetches payloads by hash from a committee member.
    async fn list_off_chain_data(
        &self,
        url: &str,
        hashes: Vec<B256>,
    ) -> PeerResult<HashMap<B256, Bytes>>;

    /// Fetches a batch from the trusted sequencer's `zkevm_getBatchByNumber`
    /// endpoint.
    async fn get_sequence_batch(&self, url: &str, batch_num: u64) -> PeerResult<SeqBatch>;
}

/// A [`PeerClient`] over per-call jsonrpsee HTTP clients.
#[derive(Debug, Clone, Copy)]
pub struct JsonRpcPeerClient {
    /// The request timeout applied to every call.
    timeout: Duration,
}

impl JsonRpcPeerClient {
    /// Creates a new client with the given per-request timeout.
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self, url: &str) -> PeerResult<HttpClient> {
        HttpClientBuilder::default()
            .request_timeout(self.timeout)
            .build(url)
            .map_err(|source| PeerClientError::Client { url: url.to_owned(), source })
    }
}

#[async_trait::async_trait]
impl PeerClient for JsonRpcPeerClient {
    async fn get_off_chain_data(&self, url: &str, hash: B256) -> PeerResult<Bytes> {
        Ok(DataAvailabilityApiClient::get_off_chain_data(&self.client(url)?, hash).await?)
    }

    async fn list_off_chain_data(
        &self,
        url: &str,
        hashes: Vec<B256>,
    ) -> PeerResult<HashMap<B256, Bytes>> {
        Ok(DataAvailabilityApiClient::list_off_chain_data(&self.client(url)?, hashes).await?)
    }

    async fn get_sequence_batch(&self, url: &str, batch_num: u64) -> PeerResult<SeqBatch> {
        Ok(SequencerApiClient::get_batch_by_number(
            &self.client(url)?,
            U64::from(batch_num),
            false,
        )
        .await?)
    }
}
