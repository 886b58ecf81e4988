//! Test utilities for the database crate.

use super::Database;
use da_node_migration::{Migrator, MigratorTrait};

/// Instantiates a new in-memory database and runs the migrations
/// to set up the schema.
pub async fn setup_test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.expect("failed to open in-memory database");
    Migrator::up(db.connection(), None).await.expect("failed to run migrations");
    db
}
