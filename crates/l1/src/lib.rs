//! L1 adapter for the data availability node: contract bindings and a
//! read-only client over the rollup and committee contracts.

pub mod abi;

mod client;
pub use client::{Block, EthereumClient, L1Client, L1Header, SequenceBatchesEvent};
#[cfg(any(test, feature = "test-utils"))]
pub use client::MockL1Client;

mod error;
pub use error::{L1ClientError, L1ClientResult};

mod subscription;
pub use subscription::EventSubscription;
