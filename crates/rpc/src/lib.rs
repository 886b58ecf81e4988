//! JSON-RPC surface of the data availability node: the public API served to
//! peers and verifiers, and the clients used to reach other committee
//! members and the trusted sequencer.

mod api;
pub use api::{
    DataAvailabilityApiClient, DataAvailabilityApiServer, SequencerApiClient, StatusResponse,
};

mod client;
#[cfg(any(test, feature = "test-utils"))]
pub use client::MockPeerClient;
pub use client::{JsonRpcPeerClient, PeerClient, PeerClientError, PeerResult};

mod server;
pub use server::{DataAvailabilityServer, RpcServerError, NOT_SYNCHRONIZED_CODE, UNAUTHORIZED_CODE};
