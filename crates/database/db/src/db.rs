use super::{transaction::DatabaseTransaction, DatabaseConnectionProvider};
use crate::error::DatabaseError;

use sea_orm::{Database as SeaOrmDatabase, DatabaseConnection, TransactionTrait};

/// The [`Database`] struct is responsible for interacting with the database.
///
/// The [`Database`] type wraps a [`sea_orm::DatabaseConnection`]. We implement
/// [`DatabaseConnectionProvider`] for [`Database`] such that it can be used to perform the
/// operations defined in [`crate::DatabaseOperations`]. Atomic operations can be performed using
/// the [`Database::tx`] method which returns a [`DatabaseTransaction`] that also implements the
/// [`DatabaseConnectionProvider`] trait and also the [`crate::DatabaseOperations`] trait.
#[derive(Debug)]
pub struct Database {
    /// The underlying database connection.
    connection: DatabaseConnection,
}

impl Database {
    /// Creates a new [`Database`] instance associated with the provided database URL.
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let connection = SeaOrmDatabase::connect(database_url).await?;
        Ok(Self { connection })
    }

    /// Creates a new [`DatabaseTransaction`] which can be used for atomic operations.
    pub async fn tx(&self) -> Result<DatabaseTransaction, DatabaseError> {
        Ok(DatabaseTransaction::new(self.connection.begin().await?))
    }

    /// Returns the concrete connection, e.g. for running migrations.
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

impl DatabaseConnectionProvider for Database {
    type Connection = DatabaseConnection;

    fn get_connection(&self) -> &Self::Connection {
        &self.connection
    }
}

impl From<DatabaseConnection> for Database {
    fn from(connection: DatabaseConnection) -> Self {
        Self { connection }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        operations::DatabaseOperations, test_utils::setup_test_db, DatabaseError, L1_SYNC_TASK,
    };

    use alloy_primitives::{keccak256, Bytes, B256};
    use da_node_primitives::{BatchKey, OffChainData};

    fn off_chain_data(payload: &'static [u8], batch_num: u64) -> OffChainData {
        OffChainData::new(Bytes::from_static(payload), batch_num)
    }

    #[tokio::test]
    async fn test_database_round_trip_off_chain_data() {
        // Set up the test database.
        let db = setup_test_db().await;

        let data = off_chain_data(b"round trip payload", 3);

        // Round trip the payload through the database.
        db.store_off_chain_data(std::slice::from_ref(&data)).await.unwrap();
        let data_from_db = db.get_off_chain_data(data.key).await.unwrap();
        assert_eq!(data, data_from_db);
        assert_eq!(data_from_db.key, keccak256(&data_from_db.value));
    }

    #[tokio::test]
    async fn test_database_off_chain_data_upsert_is_idempotent() {
        let db = setup_test_db().await;

        let data = off_chain_data(b"stored twice", 1);
        db.store_off_chain_data(std::slice::from_ref(&data)).await.unwrap();
        db.store_off_chain_data(std::slice::from_ref(&data)).await.unwrap();

        assert_eq!(db.count_off_chain_data().await.unwrap(), 1);
        assert_eq!(db.get_off_chain_data(data.key).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_database_get_off_chain_data_missing_key() {
        let db = setup_test_db().await;

        let result = db.get_off_chain_data(B256::repeat_byte(0x01)).await;
        assert!(matches!(result, Err(DatabaseError::StateNotSynchronized)));
    }

    #[tokio::test]
    async fn test_database_list_off_chain_data() {
        let db = setup_test_db().await;

        let first = off_chain_data(b"first", 1);
        let second = off_chain_data(b"second", 2);
        db.store_off_chain_data(&[first.clone(), second.clone()]).await.unwrap();

        // empty input yields an empty result.
        assert!(db.list_off_chain_data(&[]).await.unwrap().is_empty());

        let listed = db.list_off_chain_data(&[first.key, second.key]).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&first));
        assert!(listed.contains(&second));

        // missing keys are simply absent.
        let partial =
            db.list_off_chain_data(&[first.key, B256::repeat_byte(0xff)]).await.unwrap();
        assert_eq!(partial, vec![first]);
    }

    #[tokio::test]
    async fn test_database_unresolved_batch_keys_round_trip() {
        let db = setup_test_db().await;

        let keys = vec![
            BatchKey { number: 1, hash: B256::repeat_byte(0x01) },
            BatchKey { number: 2, hash: B256::repeat_byte(0x02) },
        ];

        db.store_unresolved_batch_keys(&keys).await.unwrap();
        // conflicting inserts are ignored.
        db.store_unresolved_batch_keys(&keys).await.unwrap();

        let stored = db.get_unresolved_batch_keys(10).await.unwrap();
        assert_eq!(stored.len(), 2);
        for key in &keys {
            assert!(stored.contains(key));
        }

        db.delete_unresolved_batch_keys(&keys[..1]).await.unwrap();
        let stored = db.get_unresolved_batch_keys(10).await.unwrap();
        assert_eq!(stored, vec![keys[1]]);

        // deleting missing keys is a no-op.
        db.delete_unresolved_batch_keys(&keys).await.unwrap();
        assert!(db.get_unresolved_batch_keys(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_get_unresolved_batch_keys_respects_limit() {
        let db = setup_test_db().await;

        let keys: Vec<_> = (0..5)
            .map(|i| BatchKey { number: i, hash: B256::repeat_byte(i as u8) })
            .collect();
        db.store_unresolved_batch_keys(&keys).await.unwrap();

        assert_eq!(db.get_unresolved_batch_keys(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_database_last_processed_block_upsert() {
        let db = setup_test_db().await;

        assert_eq!(db.get_last_processed_block(L1_SYNC_TASK).await.unwrap(), None);

        db.store_last_processed_block(L1_SYNC_TASK, 100).await.unwrap();
        assert_eq!(db.get_last_processed_block(L1_SYNC_TASK).await.unwrap(), Some(100));

        db.store_last_processed_block(L1_SYNC_TASK, 104).await.unwrap();
        assert_eq!(db.get_last_processed_block(L1_SYNC_TASK).await.unwrap(), Some(104));
    }

    #[tokio::test]
    async fn test_database_tx() {
        // Setup the test database.
        let db = setup_test_db().await;

        let data = off_chain_data(b"tx payload", 9);
        let key = BatchKey { number: 9, hash: data.key };
        db.store_unresolved_batch_keys(std::slice::from_ref(&key)).await.unwrap();

        // Store the payload and delete its key in a transaction.
        let tx = db.tx().await.unwrap();
        tx.store_off_chain_data(std::slice::from_ref(&data)).await.unwrap();
        tx.delete_unresolved_batch_keys(std::slice::from_ref(&key)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(db.get_off_chain_data(data.key).await.unwrap(), data);
        assert!(db.get_unresolved_batch_keys(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_tx_rollback_discards_writes() {
        let db = setup_test_db().await;

        let data = off_chain_data(b"discarded", 1);
        let tx = db.tx().await.unwrap();
        tx.store_off_chain_data(std::slice::from_ref(&data)).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.count_off_chain_data().await.unwrap(), 0);
    }
}
