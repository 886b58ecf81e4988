use da_node_primitives::OffChainData;

use alloy_primitives::B256;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents an off-chain batch payload keyed by its
/// Keccak-256 digest.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "offchain_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    key: Vec<u8>,
    value: Vec<u8>,
    batch_num: i64,
}

/// The relation for the off-chain data model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the off-chain data model.
impl ActiveModelBehavior for ActiveModel {}

impl From<OffChainData> for ActiveModel {
    fn from(data: OffChainData) -> Self {
        Self {
            key: ActiveValue::Set(data.key.to_vec()),
            value: ActiveValue::Set(data.value.to_vec()),
            batch_num: ActiveValue::Set(
                data.batch_num.try_into().expect("batch number should fit in i64"),
            ),
        }
    }
}

impl From<Model> for OffChainData {
    fn from(value: Model) -> Self {
        Self {
            key: B256::from_slice(&value.key),
            value: value.value.into(),
            batch_num: value.batch_num as u64,
        }
    }
}
