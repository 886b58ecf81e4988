use super::{models, DatabaseError};
use crate::DatabaseConnectionProvider;

use alloy_primitives::B256;
use da_node_primitives::{BatchKey, OffChainData};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
};

/// The [`DatabaseOperations`] trait provides methods for interacting with the database.
///
/// It is implemented for every [`DatabaseConnectionProvider`], so each operation can run
/// either in its own implicit transaction (on [`crate::Database`]) or as part of an atomic
/// batch (on [`crate::DatabaseTransaction`]).
#[async_trait::async_trait]
pub trait DatabaseOperations: DatabaseConnectionProvider {
    /// Get the last block processed by the named sync task.
    async fn get_last_processed_block(&self, task: &str) -> Result<Option<u64>, DatabaseError> {
        Ok(models::sync_task::Entity::find_by_id(task.to_owned())
            .select_only()
            .column(models::sync_task::Column::Block)
            .into_tuple::<i64>()
            .one(self.get_connection())
            .await?
            .map(|block| block as u64))
    }

    /// Record the last block processed by the named sync task, refreshing its timestamp.
    async fn store_last_processed_block(
        &self,
        task: &str,
        block: u64,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "danode::db", task, block, "Storing last processed block in database.");
        let model: models::sync_task::ActiveModel = (task, block).into();
        Ok(models::sync_task::Entity::insert(model)
            .on_conflict(
                OnConflict::column(models::sync_task::Column::Task)
                    .update_columns([
                        models::sync_task::Column::Block,
                        models::sync_task::Column::ProcessedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.get_connection())
            .await
            .map(|_| ())?)
    }

    /// Insert unresolved batch keys, ignoring keys that are already tracked.
    async fn store_unresolved_batch_keys(&self, keys: &[BatchKey]) -> Result<(), DatabaseError> {
        for key in keys {
            tracing::trace!(target: "danode::db", batch = key.number, hash = %key.hash, "Inserting unresolved batch key into database.");
            let model: models::unresolved_batch::ActiveModel = (*key).into();
            let result = models::unresolved_batch::Entity::insert(model)
                .on_conflict_do_nothing()
                .exec(self.get_connection())
                .await;

            match result {
                // the key is already tracked.
                Err(DbErr::RecordNotInserted) => {}
                other => {
                    other?;
                }
            }
        }
        Ok(())
    }

    /// Get up to `limit` unresolved batch keys.
    async fn get_unresolved_batch_keys(&self, limit: u64) -> Result<Vec<BatchKey>, DatabaseError> {
        Ok(models::unresolved_batch::Entity::find()
            .limit(limit)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Delete the given unresolved batch keys. Missing keys are a no-op.
    async fn delete_unresolved_batch_keys(&self, keys: &[BatchKey]) -> Result<(), DatabaseError> {
        for key in keys {
            models::unresolved_batch::Entity::delete_many()
                .filter(
                    models::unresolved_batch::Column::Num
                        .eq(key.number as i64)
                        .and(models::unresolved_batch::Column::Hash.eq(key.hash.to_vec())),
                )
                .exec(self.get_connection())
                .await?;
        }
        Ok(())
    }

    /// Whether a payload with the given key is stored.
    async fn exists(&self, key: B256) -> Result<bool, DatabaseError> {
        let count = models::offchain_data::Entity::find_by_id(key.to_vec())
            .count(self.get_connection())
            .await?;
        Ok(count > 0)
    }

    /// Get the payload identified by the given key.
    async fn get_off_chain_data(&self, key: B256) -> Result<OffChainData, DatabaseError> {
        models::offchain_data::Entity::find_by_id(key.to_vec())
            .one(self.get_connection())
            .await?
            .map(Into::into)
            .ok_or(DatabaseError::StateNotSynchronized)
    }

    /// Get the payloads identified by the given keys. Order is not guaranteed
    /// and missing keys are simply absent from the result.
    async fn list_off_chain_data(
        &self,
        keys: &[B256],
    ) -> Result<Vec<OffChainData>, DatabaseError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        Ok(models::offchain_data::Entity::find()
            .filter(
                models::offchain_data::Column::Key.is_in(keys.iter().map(|key| key.to_vec())),
            )
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Upsert off-chain payloads by key.
    async fn store_off_chain_data(&self, data: &[OffChainData]) -> Result<(), DatabaseError> {
        for item in data {
            tracing::trace!(target: "danode::db", key = %item.key, batch = item.batch_num, "Inserting offchain data into database.");
            let model: models::offchain_data::ActiveModel = item.clone().into();
            models::offchain_data::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(models::offchain_data::Column::Key)
                        .update_columns([
                            models::offchain_data::Column::Value,
                            models::offchain_data::Column::BatchNum,
                        ])
                        .to_owned(),
                )
                .exec(self.get_connection())
                .await?;
        }
        Ok(())
    }

    /// The number of stored off-chain payloads.
    async fn count_off_chain_data(&self) -> Result<u64, DatabaseError> {
        Ok(models::offchain_data::Entity::find().count(self.get_connection()).await?)
    }
}

#[async_trait::async_trait]
impl<T: DatabaseConnectionProvider + Sync> DatabaseOperations for T {}
