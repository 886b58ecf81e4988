use crate::{
    abi::{DataCommittee, ValidiumRollup},
    error::{L1ClientError, L1ClientResult},
    subscription::EventSubscription,
};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{BlockNumberOrTag, Filter, TransactionTrait};
use alloy_sol_types::SolEvent;
use da_node_primitives::{Committee, CommitteeMember};
use futures::StreamExt;

/// The L1 block response.
pub type Block = alloy_rpc_types_eth::Block;

/// A block header reduced to the fields the synchronizer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1Header {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
}

/// A `SequenceBatches` event occurrence on the rollup contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceBatchesEvent {
    /// The number of the last batch in the committed sequence.
    pub batch_num: u64,
    /// The hash of the transaction that committed the sequence.
    pub tx_hash: B256,
    /// The L1 block the event was emitted at.
    pub block_number: u64,
}

/// Read-only view of the L1 chain scoped to the rollup and committee
/// contracts.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait::async_trait]
pub trait L1Client: Send + Sync {
    /// Returns the current L1 head block number.
    async fn latest_block_number(&self) -> L1ClientResult<u64>;

    /// Returns the header at the given block number.
    async fn header_by_number(&self, number: u64) -> L1ClientResult<L1Header>;

    /// Returns the full block at the given block number.
    async fn block_by_number(&self, number: u64) -> L1ClientResult<Block>;

    /// Returns the `SequenceBatches` events emitted in the inclusive block
    /// range, ordered by block.
    async fn filter_sequence_batches(
        &self,
        from: u64,
        to: u64,
    ) -> L1ClientResult<Vec<SequenceBatchesEvent>>;

    /// Returns the calldata of the given transaction.
    async fn transaction_input(&self, tx_hash: B256) -> L1ClientResult<Bytes>;

    /// Returns the address of the trusted sequencer.
    async fn trusted_sequencer(&self) -> L1ClientResult<Address>;

    /// Returns the URL of the trusted sequencer.
    async fn trusted_sequencer_url(&self) -> L1ClientResult<String>;

    /// Returns the current data availability committee.
    async fn current_committee(&self) -> L1ClientResult<Committee>;

    /// Subscribes to trusted sequencer address changes.
    async fn watch_set_trusted_sequencer(&self) -> L1ClientResult<EventSubscription<Address>>;

    /// Subscribes to trusted sequencer URL changes.
    async fn watch_set_trusted_sequencer_url(&self) -> L1ClientResult<EventSubscription<String>>;
}

/// An [`L1Client`] backed by an alloy [`Provider`].
///
/// The provider should implement some backoff strategy using
/// [`alloy_transport::layers::RetryBackoffLayer`] in the client/transport in
/// order to avoid excessive queries on the RPC provider.
#[derive(Debug, Clone)]
pub struct EthereumClient<P> {
    /// The L1 execution node provider.
    provider: P,
    /// The address of the validium rollup contract.
    rollup_address: Address,
    /// The address of the data availability committee contract.
    committee_address: Address,
}

impl<P> EthereumClient<P> {
    /// Creates a new client scoped to the given contract addresses.
    pub const fn new(provider: P, rollup_address: Address, committee_address: Address) -> Self {
        Self { provider, rollup_address, committee_address }
    }
}

#[async_trait::async_trait]
impl<P> L1Client for EthereumClient<P>
where
    P: Provider + Clone + 'static,
{
    async fn latest_block_number(&self) -> L1ClientResult<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn header_by_number(&self, number: u64) -> L1ClientResult<L1Header> {
        let block = self
            .provider
            .get_block(BlockNumberOrTag::Number(number).into())
            .await?
            .ok_or(L1ClientError::MissingBlock(number))?;
        Ok(L1Header { number: block.header.number, hash: block.header.hash })
    }

    async fn block_by_number(&self, number: u64) -> L1ClientResult<Block> {
        self.provider
            .get_block(BlockNumberOrTag::Number(number).into())
            .await?
            .ok_or(L1ClientError::MissingBlock(number))
    }

    async fn filter_sequence_batches(
        &self,
        from: u64,
        to: u64,
    ) -> L1ClientResult<Vec<SequenceBatchesEvent>> {
        let filter = Filter::new()
            .address(self.rollup_address)
            .event_signature(ValidiumRollup::SequenceBatches::SIGNATURE_HASH)
            .from_block(from)
            .to_block(to);

        tracing::trace!(target: "danode::l1", from, to, "fetching sequence batches logs");
        let logs = self.provider.get_logs(&filter).await?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            let decoded = ValidiumRollup::SequenceBatches::decode_log(&log.inner).map_err(
                |source| L1ClientError::DecodeLog { log_type: "SequenceBatches", source },
            )?;
            events.push(SequenceBatchesEvent {
                batch_num: decoded.data.numBatch,
                tx_hash: log
                    .transaction_hash
                    .ok_or(L1ClientError::MissingLogField("transaction hash"))?,
                block_number: log
                    .block_number
                    .ok_or(L1ClientError::MissingLogField("block number"))?,
            });
        }

        Ok(events)
    }

    async fn transaction_input(&self, tx_hash: B256) -> L1ClientResult<Bytes> {
        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await?
            .ok_or(L1ClientError::MissingTransaction(tx_hash))?;
        Ok(tx.input().clone())
    }

    async fn trusted_sequencer(&self) -> L1ClientResult<Address> {
        let rollup = ValidiumRollup::new(self.rollup_address, &self.provider);
        Ok(rollup.trustedSequencer().call().await?)
    }

    async fn trusted_sequencer_url(&self) -> L1ClientResult<String> {
        let rollup = ValidiumRollup::new(self.rollup_address, &self.provider);
        Ok(rollup.trustedSequencerURL().call().await?)
    }

    async fn current_committee(&self) -> L1ClientResult<Committee> {
        let committee = DataCommittee::new(self.committee_address, &self.provider);

        let required_signatures = committee.requiredAmountOfSignatures().call().await?;
        let members_hash = committee.committeeHash().call().await?;
        let amount = committee.getAmountOfMembers().call().await?;

        let mut members = Vec::with_capacity(amount.to::<usize>());
        for index in 0..amount.to::<u64>() {
            let member = committee.members(U256::from(index)).call().await?;
            members.push(CommitteeMember { addr: member.addr, url: member.url });
        }

        Ok(Committee {
            members,
            required_signatures: required_signatures.to::<u64>(),
            members_hash,
        })
    }

    async fn watch_set_trusted_sequencer(&self) -> L1ClientResult<EventSubscription<Address>> {
        let rollup = ValidiumRollup::new(self.rollup_address, self.provider.clone());
        let poller = rollup.SetTrustedSequencer_filter().watch().await?;
        let stream = poller.into_stream().map(|item| {
            item.map_err(|source| L1ClientError::DecodeLog { log_type: "SetTrustedSequencer", source })
        });
        Ok(EventSubscription::spawn(stream, |event| event.newTrustedSequencer))
    }

    async fn watch_set_trusted_sequencer_url(&self) -> L1ClientResult<EventSubscription<String>> {
        let rollup = ValidiumRollup::new(self.rollup_address, self.provider.clone());
        let poller = rollup.SetTrustedSequencerURL_filter().watch().await?;
        let stream = poller.into_stream().map(|item| {
            item.map_err(|source| L1ClientError::DecodeLog { log_type: "SetTrustedSequencerURL", source })
        });
        Ok(EventSubscription::spawn(stream, |event| event.newTrustedSequencerURL))
    }
}
