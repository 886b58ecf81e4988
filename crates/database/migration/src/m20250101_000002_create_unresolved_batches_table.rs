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
                    .table(UnresolvedBatches::Table)
                    .if_not_exists()
                    .col(big_integer(UnresolvedBatches::Num))
                    .col(binary_len(UnresolvedBatches::Hash, HASH_LENGTH))
                    .primary_key(
                        Index::create().col(UnresolvedBatches::Num).col(UnresolvedBatches::Hash),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UnresolvedBatches::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UnresolvedBatches {
    Table,
    Num,
    Hash,
}
