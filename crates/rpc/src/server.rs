use crate::api::{DataAvailabilityApiServer, StatusResponse};

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Instant};

use alloy_primitives::{Bytes, B256};
use da_node_db::{Database, DatabaseError, DatabaseOperations, L1_SYNC_TASK};
use da_node_l1::L1Client;
use da_node_primitives::SignedSequence;
use da_node_sequencer::SequencerTracker;
use jsonrpsee::{
    core::{async_trait, RpcResult},
    server::{ServerBuilder, ServerHandle},
    types::{error, ErrorObjectOwned},
};

/// Error code returned when an incoming sequence is not signed by the trusted
/// sequencer.
pub const UNAUTHORIZED_CODE: i32 = -32001;

/// Error code returned when a requested payload has not been synchronized
/// yet.
pub const NOT_SYNCHRONIZED_CODE: i32 = -32002;

/// An error raised while starting the RPC server.
#[derive(Debug, thiserror::Error)]
pub enum RpcServerError {
    /// The server could not bind its listen address.
    #[error("failed to start rpc server: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves the data availability API backed by the durable store.
pub struct DataAvailabilityServer {
    db: Arc<Database>,
    client: Arc<dyn L1Client>,
    tracker: Arc<SequencerTracker>,
    signer: Arc<dyn alloy_signer::Signer + Send + Sync>,
    started_at: Instant,
}

impl DataAvailabilityServer {
    /// Creates a new server backed by the given store, L1 client, tracker and
    /// node signing key.
    pub fn new(
        db: Arc<Database>,
        client: Arc<dyn L1Client>,
        tracker: Arc<SequencerTracker>,
        signer: Arc<dyn alloy_signer::Signer + Send + Sync>,
    ) -> Self {
        Self { db, client, tracker, signer, started_at: Instant::now() }
    }

    /// Starts the server on the given address; resolves once it is listening.
    pub async fn start(self, addr: SocketAddr) -> Result<ServerHandle, RpcServerError> {
        let server = ServerBuilder::new().build(addr).await?;
        tracing::info!(target: "danode::rpc", %addr, "rpc server listening");
        Ok(server.start(self.into_rpc()))
    }
}

#[async_trait]
impl DataAvailabilityApiServer for DataAvailabilityServer {
    async fn status(&self) -> RpcResult<StatusResponse> {
        let current_block = self.client.latest_block_number().await.map_err(internal_error)?;
        let last_processed_block = self
            .db
            .get_last_processed_block(L1_SYNC_TASK)
            .await
            .map_err(internal_error)?
            .unwrap_or_default();
        let off_chain_data_count =
            self.db.count_off_chain_data().await.map_err(internal_error)?;

        Ok(StatusResponse {
            current_block,
            last_processed_block,
            off_chain_data_count,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        })
    }

    async fn sign_sequence(&self, signed_sequence: SignedSequence) -> RpcResult<Bytes> {
        let signer_addr = signed_sequence.signer().map_err(|err| {
            ErrorObjectOwned::owned(error::INVALID_PARAMS_CODE, err.to_string(), None::<()>)
        })?;

        let expected = self.tracker.addr();
        if signer_addr != expected {
            tracing::warn!(
                target: "danode::rpc",
                recovered = %signer_addr,
                %expected,
                "rejecting sequence not signed by the trusted sequencer"
            );
            return Err(ErrorObjectOwned::owned(
                UNAUTHORIZED_CODE,
                "unauthorized: sequence is not signed by the trusted sequencer",
                None::<()>,
            ));
        }

        // persist the payloads before attesting to their availability.
        let data = signed_sequence.sequence.off_chain_data();
        let tx = self.db.tx().await.map_err(internal_error)?;
        if let Err(err) = tx.store_off_chain_data(&data).await {
            return Err(internal_error(tx.rollback_caused_by(err).await));
        }
        tx.commit().await.map_err(internal_error)?;

        tracing::debug!(
            target: "danode::rpc",
            batches = data.len(),
            "stored sequence payloads, signing attestation"
        );

        let hash = signed_sequence.sequence.hash_to_sign();
        let signature = self.signer.sign_hash(&hash).await.map_err(internal_error)?;
        Ok(signature.as_bytes().to_vec().into())
    }

    async fn get_off_chain_data(&self, hash: B256) -> RpcResult<Bytes> {
        match self.db.get_off_chain_data(hash).await {
            Ok(data) => Ok(data.value),
            Err(DatabaseError::StateNotSynchronized) => Err(not_synchronized(hash)),
            Err(err) => Err(internal_error(err)),
        }
    }

    async fn list_off_chain_data(&self, hashes: Vec<B256>) -> RpcResult<HashMap<B256, Bytes>> {
        let found = self.db.list_off_chain_data(&hashes).await.map_err(internal_error)?;
        let by_key: HashMap<B256, Bytes> =
            found.into_iter().map(|data| (data.key, data.value)).collect();

        // all-or-nothing: a single missing key fails the whole call.
        for hash in &hashes {
            if !by_key.contains_key(hash) {
                return Err(not_synchronized(*hash));
            }
        }

        Ok(by_key)
    }
}

fn internal_error(err: impl std::fmt::Display) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(error::INTERNAL_ERROR_CODE, err.to_string(), None::<()>)
}

fn not_synchronized(hash: B256) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        NOT_SYNCHRONIZED_CODE,
        format!("offchain data not found for key {hash}"),
        None::<()>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, Address};
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use da_node_db::test_utils::setup_test_db;
    use da_node_l1::MockL1Client;
    use da_node_primitives::{Batch, OffChainData, Sequence};
    use da_node_sequencer::TrackerConfig;
    use std::time::Duration;

    const SEQUENCER_URL: &str = "http://sequencer.example";

    async fn tracker_for(addr: Address) -> Arc<SequencerTracker> {
        let mut client = MockL1Client::new();
        client.expect_trusted_sequencer().returning(move || Ok(addr));
        client.expect_trusted_sequencer_url().returning(|| Ok(SEQUENCER_URL.to_owned()));

        let config =
            TrackerConfig { timeout: Duration::from_secs(60), retry: Duration::from_millis(10) };
        Arc::new(SequencerTracker::new(config, Arc::new(client)).await.unwrap())
    }

    async fn server_for(sequencer: Address) -> (DataAvailabilityServer, PrivateKeySigner) {
        let node_key = PrivateKeySigner::random();
        let server = DataAvailabilityServer::new(
            Arc::new(setup_test_db().await),
            Arc::new(MockL1Client::new()),
            tracker_for(sequencer).await,
            Arc::new(node_key.clone()),
        );
        (server, node_key)
    }

    fn signed_sequence(key: &PrivateKeySigner, payloads: &[&'static [u8]]) -> SignedSequence {
        let sequence = Sequence {
            batches: payloads
                .iter()
                .map(|payload| Batch {
                    l2_data: Bytes::from_static(payload),
                    ..Default::default()
                })
                .collect(),
            old_acc_input_hash: B256::repeat_byte(0x01),
            l1_info_root: B256::repeat_byte(0x02),
            max_sequence_timestamp: 1_700_000_000,
        };
        let signature = key.sign_hash_sync(&sequence.hash_to_sign()).unwrap();
        SignedSequence { sequence, signature: signature.as_bytes().to_vec().into() }
    }

    #[tokio::test]
    async fn test_sign_sequence_persists_and_attests() -> eyre::Result<()> {
        let sequencer_key = PrivateKeySigner::random();
        let (server, node_key) = server_for(sequencer_key.address()).await;

        let signed = signed_sequence(&sequencer_key, &[b"payload-1", b"payload-2"]);
        let attestation = server.sign_sequence(signed.clone()).await.unwrap();

        // the attestation is the node's signature over the same hash.
        let signature = alloy_primitives::Signature::from_raw(&attestation)?;
        let recovered =
            signature.recover_address_from_prehash(&signed.sequence.hash_to_sign())?;
        assert_eq!(recovered, node_key.address());

        // the payloads are stored under their digests.
        for payload in [b"payload-1".as_slice(), b"payload-2".as_slice()] {
            let stored = server.db.get_off_chain_data(keccak256(payload)).await?;
            assert_eq!(stored.value.as_ref(), payload);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_sequence_rejects_unknown_signer() -> eyre::Result<()> {
        let sequencer_key = PrivateKeySigner::random();
        let (server, _) = server_for(sequencer_key.address()).await;

        // signed by some other key than the tracked sequencer.
        let rogue = PrivateKeySigner::random();
        let signed = signed_sequence(&rogue, &[b"payload"]);

        let err = server.sign_sequence(signed).await.unwrap_err();
        assert_eq!(err.code(), UNAUTHORIZED_CODE);

        // nothing was persisted.
        assert_eq!(server.db.count_off_chain_data().await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_sequence_rejects_malformed_signature() -> eyre::Result<()> {
        let sequencer_key = PrivateKeySigner::random();
        let (server, _) = server_for(sequencer_key.address()).await;

        let mut signed = signed_sequence(&sequencer_key, &[b"payload"]);
        signed.signature = Bytes::from_static(&[0u8; 10]);

        let err = server.sign_sequence(signed).await.unwrap_err();
        assert_eq!(err.code(), error::INVALID_PARAMS_CODE);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_off_chain_data() -> eyre::Result<()> {
        let (server, _) = server_for(Address::repeat_byte(0xaa)).await;

        let data = OffChainData::new(Bytes::from_static(b"stored"), 1);
        server.db.store_off_chain_data(std::slice::from_ref(&data)).await?;

        assert_eq!(server.get_off_chain_data(data.key).await.unwrap(), data.value);

        let err = server.get_off_chain_data(B256::repeat_byte(0xff)).await.unwrap_err();
        assert_eq!(err.code(), NOT_SYNCHRONIZED_CODE);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_off_chain_data_is_all_or_nothing() -> eyre::Result<()> {
        let (server, _) = server_for(Address::repeat_byte(0xaa)).await;

        let first = OffChainData::new(Bytes::from_static(b"first"), 1);
        let second = OffChainData::new(Bytes::from_static(b"second"), 2);
        server.db.store_off_chain_data(&[first.clone(), second.clone()]).await?;

        let listed = server.list_off_chain_data(vec![first.key, second.key]).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[&first.key], first.value);
        assert_eq!(listed[&second.key], second.value);

        // one missing key fails the whole call.
        let missing = B256::repeat_byte(0xff);
        let err =
            server.list_off_chain_data(vec![first.key, missing]).await.unwrap_err();
        assert_eq!(err.code(), NOT_SYNCHRONIZED_CODE);
        assert!(err.message().contains(&missing.to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_status_reports_store_and_head() -> eyre::Result<()> {
        let mut client = MockL1Client::new();
        client.expect_latest_block_number().returning(|| Ok(105));

        let db = Arc::new(setup_test_db().await);
        db.store_last_processed_block(L1_SYNC_TASK, 104).await?;
        db.store_off_chain_data(&[OffChainData::new(Bytes::from_static(b"x"), 1)]).await?;

        let server = DataAvailabilityServer::new(
            db,
            Arc::new(client),
            tracker_for(Address::repeat_byte(0xaa)).await,
            Arc::new(PrivateKeySigner::random()),
        );

        let status = server.status().await.unwrap();
        assert_eq!(status.current_block, 105);
        assert_eq!(status.last_processed_block, 104);
        assert_eq!(status.off_chain_data_count, 1);

        Ok(())
    }
}
