//! Solidity bindings for the validium rollup contract and the data
//! availability committee contract.

use alloy_primitives::Bytes;
use alloy_sol_types::{sol, SolCall};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    contract ValidiumRollup {
        /// Per-batch data committed for a validium sequence. The payload
        /// itself stays off chain; only its digest is posted.
        struct ValidiumBatchData {
            bytes32 transactionsHash;
            bytes32 forcedGlobalExitRoot;
            uint64 forcedTimestamp;
            bytes32 forcedBlockHashL1;
        }

        event SequenceBatches(uint64 indexed numBatch, bytes32 l1InfoRoot);
        event SetTrustedSequencer(address newTrustedSequencer);
        event SetTrustedSequencerURL(string newTrustedSequencerURL);

        function trustedSequencer() external view returns (address);
        function trustedSequencerURL() external view returns (string memory);

        function sequenceBatchesValidium(
            ValidiumBatchData[] calldata batches,
            uint32 l1InfoTreeLeafCount,
            uint64 maxSequenceTimestamp,
            bytes32 expectedFinalAccInputHash,
            address l2Coinbase,
            bytes calldata dataAvailabilityMessage
        ) external;
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    contract DataCommittee {
        function requiredAmountOfSignatures() external view returns (uint256);
        function committeeHash() external view returns (bytes32);
        function getAmountOfMembers() external view returns (uint256);
        function members(uint256 index) external view returns (string memory url, address addr);
    }
}

/// Tries to decode the calldata of a sequencing transaction into the ordered
/// batch data it committed. Returns `None` for unrelated calldata.
pub fn try_decode_sequence_batches(
    calldata: &Bytes,
) -> Option<Vec<ValidiumRollup::ValidiumBatchData>> {
    match calldata.get(0..4).map(|sel| sel.try_into().expect("correct slice length")) {
        Some(ValidiumRollup::sequenceBatchesValidiumCall::SELECTOR) => {
            ValidiumRollup::sequenceBatchesValidiumCall::abi_decode(calldata)
                .map(|call| call.batches)
                .ok()
        }
        Some(_) | None => None,
    }
}
