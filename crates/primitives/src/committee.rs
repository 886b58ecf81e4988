use alloy_primitives::{Address, B256};

/// A member of the data availability committee as registered on L1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeMember {
    /// The member's address.
    pub addr: Address,
    /// The member's service URL.
    pub url: String,
}

/// The data availability committee as registered on L1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committee {
    /// The ordered committee members.
    pub members: Vec<CommitteeMember>,
    /// The number of member signatures required for a valid attestation.
    pub required_signatures: u64,
    /// The aggregate hash of the committee members.
    pub members_hash: B256,
}
