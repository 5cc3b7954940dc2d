// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! YTA chain integration.
//!
//! This module provides functionality for:
//! - Listing token holders and their YTT balances
//! - Fetching the `active` public key of an account
//! - Verifying `SIG_K1_` signatures against stored keys

pub mod client;
pub mod signature;
pub mod types;

pub use client::{ChainClient, ChainError, EosClient};
pub use signature::verify;
pub use types::*;
