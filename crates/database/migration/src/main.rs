use sea_orm_migration::prelude::*;

#[async_std::main]
async fn main() {
    tracing::info!(target: "danode::migration", "Running database migrations.");
    cli::run_cli(da_node_migration::Migrator).await;
    tracing::info!(target: "danode::migration", "Database migrations complete.")
}
