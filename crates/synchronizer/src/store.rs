//! Transaction-scoped store helpers shared by the synchronizer and resolver.

use alloy_primitives::B256;
use da_node_db::{Database, DatabaseError, DatabaseOperations, L1_SYNC_TASK};
use da_node_primitives::{BatchKey, OffChainData};

/// Returns the block the synchronizer last processed, if any.
pub(crate) async fn get_start_block(db: &Database) -> Result<Option<u64>, DatabaseError> {
    db.get_last_processed_block(L1_SYNC_TASK).await
}

/// Persists the synchronizer cursor on its own.
pub(crate) async fn set_start_block(db: &Database, block: u64) -> Result<(), DatabaseError> {
    let tx = db.tx().await?;
    if let Err(err) = tx.store_last_processed_block(L1_SYNC_TASK, block).await {
        return Err(tx.rollback_caused_by(err).await);
    }
    tx.commit().await
}

/// Whether the payload for the given key is already stored. Lookup failures
/// are treated as absence.
pub(crate) async fn exists(db: &Database, key: B256) -> bool {
    db.exists(key).await.unwrap_or_else(|err| {
        tracing::debug!(target: "danode::synchronizer", ?err, %key, "failed to check offchain data existence");
        false
    })
}

/// Returns up to `limit` unresolved batch keys.
pub(crate) async fn get_unresolved_batch_keys(
    db: &Database,
    limit: u64,
) -> Result<Vec<BatchKey>, DatabaseError> {
    db.get_unresolved_batch_keys(limit).await
}

/// Atomically records newly discovered keys and advances the cursor, so the
/// cursor never moves past a block whose keys were not recorded.
pub(crate) async fn store_discovered(
    db: &Database,
    keys: &[BatchKey],
    block: u64,
) -> Result<(), DatabaseError> {
    let tx = db.tx().await?;
    if let Err(err) = tx.store_unresolved_batch_keys(keys).await {
        return Err(tx.rollback_caused_by(err).await);
    }
    if let Err(err) = tx.store_last_processed_block(L1_SYNC_TASK, block).await {
        return Err(tx.rollback_caused_by(err).await);
    }
    tx.commit().await
}

/// Atomically persists resolved payloads and clears their unresolved keys, so
/// a payload is never visible while its key is still marked unresolved.
pub(crate) async fn store_resolved(
    db: &Database,
    data: &[OffChainData],
    keys: &[BatchKey],
) -> Result<(), DatabaseError> {
    let tx = db.tx().await?;
    if let Err(err) = tx.store_off_chain_data(data).await {
        return Err(tx.rollback_caused_by(err).await);
    }
    if let Err(err) = tx.delete_unresolved_batch_keys(keys).await {
        return Err(tx.rollback_caused_by(err).await);
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use da_node_db::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_start_block_round_trip() {
        let db = setup_test_db().await;

        assert_eq!(get_start_block(&db).await.unwrap(), None);

        set_start_block(&db, 100).await.unwrap();
        assert_eq!(get_start_block(&db).await.unwrap(), Some(100));

        set_start_block(&db, 104).await.unwrap();
        assert_eq!(get_start_block(&db).await.unwrap(), Some(104));
    }

    #[tokio::test]
    async fn test_exists() {
        let db = setup_test_db().await;
        let data = OffChainData::new(Bytes::from_static(b"present"), 1);

        assert!(!exists(&db, data.key).await);
        db.store_off_chain_data(std::slice::from_ref(&data)).await.unwrap();
        assert!(exists(&db, data.key).await);
    }

    #[tokio::test]
    async fn test_store_discovered_commits_keys_and_cursor_together() {
        let db = setup_test_db().await;

        let keys = vec![
            BatchKey { number: 1, hash: B256::repeat_byte(0x01) },
            BatchKey { number: 2, hash: B256::repeat_byte(0x02) },
        ];
        store_discovered(&db, &keys, 104).await.unwrap();

        assert_eq!(get_start_block(&db).await.unwrap(), Some(104));
        let unresolved = get_unresolved_batch_keys(&db, 10).await.unwrap();
        assert_eq!(unresolved.len(), 2);

        // replays of the same range are idempotent.
        store_discovered(&db, &keys, 104).await.unwrap();
        assert_eq!(get_unresolved_batch_keys(&db, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_resolved_clears_unresolved_keys() {
        let db = setup_test_db().await;

        let data = OffChainData::new(Bytes::from_static(b"resolved payload"), 5);
        let key = BatchKey { number: 5, hash: data.key };
        store_discovered(&db, std::slice::from_ref(&key), 50).await.unwrap();

        store_resolved(&db, std::slice::from_ref(&data), std::slice::from_ref(&key))
            .await
            .unwrap();

        assert!(get_unresolved_batch_keys(&db, 10).await.unwrap().is_empty());
        assert_eq!(db.get_off_chain_data(data.key).await.unwrap(), data);
    }
}
