// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use ytt_registry::{
    api::router,
    blockchain::{
        ChainClient, ChainConfig, EosClient, DEFAULT_KEY_PREFIX, DEFAULT_RPC_URL,
        DEFAULT_TOKEN_CONTRACT, DEFAULT_TOKEN_PRECISION, DEFAULT_TOKEN_SYMBOL,
    },
    config::*,
    registry::Registry,
    snapshot::SnapshotReconciler,
    state::AppState,
    storage::{InMemoryStore, RegistryDatabase, RegistryStore},
};

#[derive(Debug, Parser)]
#[command(name = "ytt-registry", version, about = "YTA account to ERC-20 address registry")]
struct Cli {
    /// Registry database path
    #[arg(long, global = true, env = REGISTRY_DB_ENV, default_value = DEFAULT_REGISTRY_DB)]
    db_path: PathBuf,

    #[command(flatten)]
    chain: ChainArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ChainArgs {
    /// Chain RPC endpoint
    #[arg(long, global = true, env = CHAIN_RPC_URL_ENV, default_value = DEFAULT_RPC_URL)]
    chain_url: String,

    /// Token contract account
    #[arg(long, global = true, env = TOKEN_CONTRACT_ENV, default_value = DEFAULT_TOKEN_CONTRACT)]
    token_contract: String,

    /// Token symbol to snapshot
    #[arg(long, global = true, env = TOKEN_SYMBOL_ENV, default_value = DEFAULT_TOKEN_SYMBOL)]
    token_symbol: String,

    /// Token decimal places
    #[arg(long, global = true, env = TOKEN_PRECISION_ENV, default_value_t = DEFAULT_TOKEN_PRECISION)]
    token_precision: u8,

    /// Public key prefix stripped before storage
    #[arg(long, global = true, env = CHAIN_KEY_PREFIX_ENV, default_value = DEFAULT_KEY_PREFIX)]
    key_prefix: String,
}

impl From<ChainArgs> for ChainConfig {
    fn from(args: ChainArgs) -> Self {
        Self {
            rpc_url: args.chain_url,
            token_contract: args.token_contract,
            token_symbol: args.token_symbol,
            token_precision: args.token_precision,
            key_prefix: args.key_prefix,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the registry HTTP server
    Serve {
        #[arg(long, env = HOST_ENV, default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Keep records in memory instead of the database
        #[arg(long)]
        ephemeral: bool,
    },
    /// Copy on-chain balances into the registry once
    Snapshot,
    /// Mark an account as excluded from payouts
    Exclude {
        account: String,

        /// Clear the flag instead of setting it
        #[arg(long)]
        undo: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let client = EosClient::new(cli.chain.into()).context("Failed to configure chain client")?;
    let config = client.config();
    info!(
        rpc_url = %config.rpc_url,
        token = %config.token_symbol,
        precision = config.token_precision,
        "Chain client configured"
    );
    let chain: Arc<dyn ChainClient> = Arc::new(client);

    match cli.command {
        Command::Serve {
            host,
            port,
            ephemeral,
        } => {
            let store: Arc<dyn RegistryStore> = if ephemeral {
                info!("Using in-memory registry store");
                Arc::new(InMemoryStore::new())
            } else {
                Arc::new(open_database(&cli.db_path)?)
            };
            serve(AppState::new(store, chain), &host, port).await
        }
        Command::Snapshot => {
            let store = Arc::new(open_database(&cli.db_path)?);
            let report = SnapshotReconciler::new(store, chain)
                .run()
                .await
                .context("Snapshot aborted")?;
            info!(
                created = report.created,
                updated = report.updated,
                failed = report.failed,
                "Snapshot finished"
            );
            Ok(())
        }
        Command::Exclude { account, undo } => {
            let store = Arc::new(open_database(&cli.db_path)?);
            Registry::new(store, chain)
                .set_excluded(&account, !undo)
                .await
                .with_context(|| format!("Failed to update exclusion of {account}"))
        }
    }
}

fn open_database(path: &std::path::Path) -> anyhow::Result<RegistryDatabase> {
    info!(path = %path.display(), "Opening registry database");
    RegistryDatabase::open(path)
        .with_context(|| format!("Failed to open registry database at {}", path.display()))
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    info!(%addr, "YTT registry listening (docs at /docs)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")
}
