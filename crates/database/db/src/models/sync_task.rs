use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model tracking the last L1 block processed by a named task.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    task: String,
    block: i64,
    processed_at: DateTimeWithTimeZone,
}

/// The relation for the sync task model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the sync task model.
impl ActiveModelBehavior for ActiveModel {}

impl From<(&str, u64)> for ActiveModel {
    fn from((task, block): (&str, u64)) -> Self {
        Self {
            task: ActiveValue::Set(task.to_owned()),
            block: ActiveValue::Set(block.try_into().expect("block number should fit in i64")),
            processed_at: ActiveValue::Set(chrono::Utc::now().fixed_offset()),
        }
    }
}
