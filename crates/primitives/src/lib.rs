//! Primitive types shared across the data availability node.

mod batch;
pub use batch::{BatchKey, OffChainData, SeqBatch};

mod committee;
pub use committee::{Committee, CommitteeMember};

mod sequence;
pub use sequence::{Batch, Sequence, SequenceError, SignedSequence, SIGNATURE_LENGTH};
