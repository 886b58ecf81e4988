//! Schema migrations for the data availability node database.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_sync_tasks_table;
mod m20250101_000002_create_unresolved_batches_table;
mod m20250101_000003_create_offchain_data_table;

/// The migrator for the data availability node schema.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_sync_tasks_table::Migration),
            Box::new(m20250101_000002_create_unresolved_batches_table::Migration),
            Box::new(m20250101_000003_create_offchain_data_table::Migration),
        ]
    }
}
