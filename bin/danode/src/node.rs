//! Construction and lifecycle of the node's long-running tasks.

use crate::config::{Config, ConfigError};

use std::{net::SocketAddr, sync::Arc};

use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use da_node_db::Database;
use da_node_l1::{EthereumClient, L1Client, L1ClientError};
use da_node_migration::{Migrator, MigratorTrait};
use da_node_rpc::{DataAvailabilityServer, JsonRpcPeerClient, RpcServerError};
use da_node_sequencer::{SequencerTracker, TrackerConfig};
use da_node_synchronizer::{BatchSynchronizer, Resolver, SynchronizerConfig, SynchronizerError};
use tokio_util::sync::CancellationToken;

/// A fatal error during node construction or shutdown.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The database could not be reached.
    #[error("database error: {0}")]
    Database(#[from] da_node_db::DatabaseError),
    /// The schema migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] da_node_db::DbErr),
    /// The keystore could not be decrypted.
    #[error("keystore error: {0}")]
    Keystore(#[from] alloy_signer_local::LocalSignerError),
    /// The L1 RPC URL is invalid.
    #[error("invalid L1 rpc url: {0}")]
    Url(#[from] url::ParseError),
    /// The L1 could not be reached.
    #[error(transparent)]
    L1(#[from] L1ClientError),
    /// The synchronizer could not be constructed.
    #[error(transparent)]
    Synchronizer(#[from] SynchronizerError),
    /// The RPC server could not be started.
    #[error(transparent)]
    Rpc(#[from] RpcServerError),
    /// The RPC listen address is invalid.
    #[error("invalid rpc listen address: {0}")]
    ListenAddr(#[from] std::net::AddrParseError),
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Builds every subsystem from the configuration, runs them until an
/// interrupt arrives, then shuts them down.
pub async fn run(config: Config) -> Result<(), NodeError> {
    // the store is the single source of truth; reach it first.
    let db = Arc::new(Database::new(&config.db.conn_str).await?);
    Migrator::up(db.connection(), None).await?;

    let signer = PrivateKeySigner::decrypt_keystore(
        &config.private_key.path,
        &config.private_key.password,
    )?;
    let self_addr = signer.address();

    let provider = ProviderBuilder::new().connect_http(config.l1.rpc_url.parse()?);
    let client: Arc<dyn L1Client> = Arc::new(EthereumClient::new(
        provider,
        config.l1.validium_contract,
        config.l1.committee_contract,
    ));

    let tracker = Arc::new(
        SequencerTracker::new(
            TrackerConfig {
                timeout: config.l1.timeout(),
                retry: config.l1.retry_period(),
            },
            client.clone(),
        )
        .await?,
    );

    let peers = Arc::new(JsonRpcPeerClient::new(config.peer.timeout()));
    let resolver =
        Resolver::new(db.clone(), client.clone(), peers, tracker.clone(), self_addr);
    let synchronizer = BatchSynchronizer::new(
        db.clone(),
        client.clone(),
        resolver,
        SynchronizerConfig {
            genesis_block: config.l1.genesis_block,
            block_batch_size: config.l1.block_batch_size,
            confirmation_depth: config.l1.confirmation_depth,
            reorg_window: config.l1.reorg_window,
            resolve_batch_limit: config.l1.resolve_batch_limit,
            sync_interval: config.l1.sync_interval(),
        },
    )
    .await?;

    let listen_addr = SocketAddr::new(config.rpc.host.parse()?, config.rpc.port);
    let server = DataAvailabilityServer::new(
        db.clone(),
        client.clone(),
        tracker.clone(),
        Arc::new(signer),
    );
    let server_handle = server.start(listen_addr).await?;

    tracing::info!(target: "danode", addr = %self_addr, "data availability node started");

    let cancel = CancellationToken::new();
    let mut tasks = tracker.start(cancel.clone());
    tasks.push(tokio::spawn(synchronizer.run(cancel.clone())));

    tokio::signal::ctrl_c().await?;
    tracing::info!(target: "danode", "interrupt received, shutting down");

    cancel.cancel();
    for task in tasks {
        let _ = task.await;
    }

    let _ = server_handle.stop();
    server_handle.stopped().await;

    tracing::info!(target: "danode", "shutdown complete");
    Ok(())
}
