use da_node_primitives::BatchKey;

use alloy_primitives::B256;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a sequenced batch whose payload has not
/// been stored yet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "unresolved_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    num: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    hash: Vec<u8>,
}

/// The relation for the unresolved batch model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the unresolved batch model.
impl ActiveModelBehavior for ActiveModel {}

impl From<BatchKey> for ActiveModel {
    fn from(key: BatchKey) -> Self {
        Self {
            num: ActiveValue::Set(key.number.try_into().expect("batch number should fit in i64")),
            hash: ActiveValue::Set(key.hash.to_vec()),
        }
    }
}

impl From<Model> for BatchKey {
    fn from(value: Model) -> Self {
        Self {
            number: value.num as u64,
            hash: B256::from_slice(&value.hash),
        }
    }
}
