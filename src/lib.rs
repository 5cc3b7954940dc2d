// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! YTT Registry - YTA chain account to ERC-20 payout address registry
//!
//! Account holders prove ownership of a chain account by signing
//! `account=<account>&ethaddr=<address>` with the account's active key; the
//! service verifies the `SIG_K1_` signature against the key recorded at first
//! sight and links the address.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - YTA chain RPC client and K1 signature verification
//! - `registry` - Account registry state machine
//! - `snapshot` - Chain balance snapshot job
//! - `storage` - Registry document store (redb)

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod storage;
