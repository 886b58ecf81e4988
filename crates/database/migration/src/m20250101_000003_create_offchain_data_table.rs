use sea_orm_migration::{prelude::*, schema::*};

const HASH_LENGTH: u32 = 32;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OffchainData::Table)
                    .if_not_exists()
                    .col(binary_len(OffchainData::Key, HASH_LENGTH).primary_key())
                    .col(binary(OffchainData::Value))
                    .col(big_integer(OffchainData::BatchNum))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OffchainData::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OffchainData {
    Table,
    Key,
    Value,
    BatchNum,
}
