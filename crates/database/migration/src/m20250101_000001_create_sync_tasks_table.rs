use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncTasks::Table)
                    .if_not_exists()
                    .col(string(SyncTasks::Task).primary_key())
                    .col(big_integer(SyncTasks::Block))
                    .col(
                        timestamp_with_time_zone(SyncTasks::ProcessedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SyncTasks::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SyncTasks {
    Table,
    Task,
    Block,
    ProcessedAt,
}
