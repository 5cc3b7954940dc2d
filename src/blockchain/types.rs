// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain types, RPC payloads and constants.

use serde::{Deserialize, Serialize};

/// Default chain RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8888";

/// Token contract that owns the `accounts` table.
pub const DEFAULT_TOKEN_CONTRACT: &str = "eosio.token";

/// Token whose balances are snapshotted.
pub const DEFAULT_TOKEN_SYMBOL: &str = "YTT";

/// Decimal places of the snapshotted token; balances are stored in these minor units.
pub const DEFAULT_TOKEN_PRECISION: u8 = 4;

/// Prefix the chain puts in front of encoded public keys.
pub const DEFAULT_KEY_PREFIX: &str = "YTA";

/// Permission whose key anchors account ownership.
pub const ACTIVE_PERMISSION: &str = "active";

/// Rows requested per `get_table_by_scope` page.
pub const SCOPE_PAGE_LIMIT: u32 = 100;

/// Chain endpoint and token configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Token contract account
    pub token_contract: String,
    /// Token symbol (e.g., "YTT")
    pub token_symbol: String,
    /// Token decimal places (e.g., 4 for "1.0000 YTT")
    pub token_precision: u8,
    /// Public key prefix stripped before storage (e.g., "YTA")
    pub key_prefix: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            token_contract: DEFAULT_TOKEN_CONTRACT.to_string(),
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            token_precision: DEFAULT_TOKEN_PRECISION,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// An on-chain token holder and its balance in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAccount {
    pub account_id: String,
    pub balance: i64,
}

impl ChainAccount {
    pub fn new(account_id: impl Into<String>, balance: i64) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
        }
    }
}

// =============================================================================
// RPC payloads
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct TableByScopeRequest<'a> {
    pub code: &'a str,
    pub table: &'a str,
    pub limit: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub lower_bound: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableByScopeResponse {
    pub rows: Vec<ScopeRow>,
    #[serde(default)]
    pub more: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScopeRow {
    pub scope: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CurrencyBalanceRequest<'a> {
    pub code: &'a str,
    pub account: &'a str,
    pub symbol: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetAccountRequest<'a> {
    pub account_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetAccountResponse {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Permission {
    pub perm_name: String,
    pub required_auth: Authority,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Authority {
    #[serde(default)]
    pub keys: Vec<KeyWeight>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyWeight {
    pub key: String,
}

impl GetAccountResponse {
    /// First key of the `active` permission.
    pub fn active_key(&self) -> Option<&str> {
        self.permissions
            .iter()
            .find(|p| p.perm_name == ACTIVE_PERMISSION)
            .and_then(|p| p.required_auth.keys.first())
            .map(|k| k.key.as_str())
    }
}

/// Error body returned by the chain RPC on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorBody {
    #[serde(default)]
    pub message: String,
    pub error: Option<RpcErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub what: String,
}

/// Exception names the chain uses for a missing account.
const MISSING_ACCOUNT_EXCEPTIONS: &[&str] = &["unknown_key_exception", "account_query_exception"];

impl RpcErrorBody {
    pub fn is_missing_account(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|e| MISSING_ACCOUNT_EXCEPTIONS.contains(&e.name.as_str()))
    }

    pub fn describe(&self) -> String {
        match &self.error {
            Some(detail) if !detail.what.is_empty() => format!("{}: {}", detail.name, detail.what),
            Some(detail) => detail.name.clone(),
            None => self.message.clone(),
        }
    }
}

// =============================================================================
// Asset parsing
// =============================================================================

/// Why an asset string yielded no balance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("asset {0:?} is another token")]
    OtherSymbol(String),

    #[error("malformed asset {0:?}")]
    Malformed(String),
}

/// Parse an asset string such as `"12.3400 YTT"` into minor units (`123400`).
///
/// Amounts are scaled to `precision` decimal places, so `"5 YTT"` and
/// `"5.0000 YTT"` agree. More fractional digits than `precision`, or an
/// amount outside `i64`, is malformed.
pub fn parse_asset_amount(asset: &str, symbol: &str, precision: u8) -> Result<i64, AssetError> {
    let malformed = || AssetError::Malformed(asset.to_string());

    let (amount, asset_symbol) = asset.trim().split_once(' ').ok_or_else(malformed)?;
    if asset_symbol.trim() != symbol {
        return Err(AssetError::OtherSymbol(asset.to_string()));
    }

    let (negative, digits) = match amount.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, amount),
    };

    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let precision = usize::from(precision);
    if whole.is_empty()
        || fraction.len() > precision
        || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }

    let units: i64 = format!("{whole}{fraction:0<precision$}")
        .parse()
        .map_err(|_| malformed())?;
    Ok(if negative { -units } else { units })
}
