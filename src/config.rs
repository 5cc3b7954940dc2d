// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Every variable can also be given as a CLI flag.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `REGISTRY_DB` | Path of the redb registry database | `./data/registry.redb` |
//! | `CHAIN_RPC_URL` | YTA chain RPC endpoint | `http://127.0.0.1:8888` |
//! | `TOKEN_CONTRACT` | Token contract account | `eosio.token` |
//! | `TOKEN_SYMBOL` | Snapshotted token symbol | `YTT` |
//! | `TOKEN_PRECISION` | Token decimal places (minor units per token = 10^n) | `4` |
//! | `CHAIN_KEY_PREFIX` | Public key prefix stripped before storage | `YTA` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable name for the registry database path.
///
/// The parent directory is created on startup if missing.
pub const REGISTRY_DB_ENV: &str = "REGISTRY_DB";
pub const DEFAULT_REGISTRY_DB: &str = "./data/registry.redb";

pub const CHAIN_RPC_URL_ENV: &str = "CHAIN_RPC_URL";
pub const TOKEN_CONTRACT_ENV: &str = "TOKEN_CONTRACT";
pub const TOKEN_SYMBOL_ENV: &str = "TOKEN_SYMBOL";
pub const TOKEN_PRECISION_ENV: &str = "TOKEN_PRECISION";

/// Environment variable name for the chain key prefix.
///
/// Keys are stored without it; only an exact leading match is removed.
pub const CHAIN_KEY_PREFIX_ENV: &str = "CHAIN_KEY_PREFIX";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Install the global tracing subscriber (`LOG_FORMAT=json` for JSON lines).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
