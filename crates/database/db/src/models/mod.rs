pub(crate) mod offchain_data;
pub(crate) mod sync_task;
pub(crate) mod unresolved_batch;
