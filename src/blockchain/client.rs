// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! YTA chain client over the EOS-compatible `/v1/chain/*` HTTP RPC.

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use super::types::*;

/// Chain capability consumed by the registry and the snapshot job.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// List every holder of the configured token with its balance.
    async fn list_accounts_with_balances(&self) -> Result<Vec<ChainAccount>, ChainError>;

    /// Fetch the key of the account's `active` permission, chain prefix removed.
    async fn get_active_public_key(&self, account_id: &str) -> Result<String, ChainError>;
}

/// Errors that can occur during chain queries.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account {0} has no active key")]
    NoActiveKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Unexpected RPC response: {0}")]
    InvalidResponse(String),
}

impl ChainError {
    /// Whether the chain positively reported that the account cannot anchor a record.
    pub fn is_missing_account(&self) -> bool {
        matches!(self, Self::AccountNotFound(_) | Self::NoActiveKey(_))
    }
}

/// HTTP client for the YTA chain RPC.
pub struct EosClient {
    config: ChainConfig,
    base_url: url::Url,
    http: Client,
}

impl EosClient {
    /// Create a new client for the given chain configuration.
    pub fn new(config: ChainConfig) -> Result<Self, ChainError> {
        let base_url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            http: Client::new(),
        })
    }

    /// Get the chain configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// POST a JSON body to `/v1/chain/{endpoint}` and decode the response.
    async fn call<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, ChainError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(&format!("v1/chain/{endpoint}"))
            .map_err(|e| ChainError::InvalidRpcUrl(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_rpc_failure(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ChainError::InvalidResponse(e.to_string()))
    }

    /// Token balance of one account in minor units (0 when it holds none).
    async fn get_balance(&self, account_id: &str) -> Result<i64, ChainError> {
        let assets: Vec<String> = self
            .call(
                "get_currency_balance",
                &CurrencyBalanceRequest {
                    code: &self.config.token_contract,
                    account: account_id,
                    symbol: &self.config.token_symbol,
                },
            )
            .await?;

        token_balance(&assets, &self.config.token_symbol, self.config.token_precision)
    }
}

/// Balance of `symbol` among an account's assets, 0 when it holds none.
fn token_balance(assets: &[String], symbol: &str, precision: u8) -> Result<i64, ChainError> {
    for asset in assets {
        match parse_asset_amount(asset, symbol, precision) {
            Ok(units) => return Ok(units),
            Err(AssetError::OtherSymbol(_)) => continue,
            Err(e @ AssetError::Malformed(_)) => {
                return Err(ChainError::InvalidResponse(e.to_string()));
            }
        }
    }
    Ok(0)
}

#[async_trait::async_trait]
impl ChainClient for EosClient {
    async fn list_accounts_with_balances(&self) -> Result<Vec<ChainAccount>, ChainError> {
        let mut accounts = Vec::new();
        let mut lower_bound = String::new();

        loop {
            let page: TableByScopeResponse = self
                .call(
                    "get_table_by_scope",
                    &TableByScopeRequest {
                        code: &self.config.token_contract,
                        table: "accounts",
                        limit: SCOPE_PAGE_LIMIT,
                        lower_bound: &lower_bound,
                    },
                )
                .await?;

            for row in page.rows {
                match self.get_balance(&row.scope).await {
                    Ok(balance) => accounts.push(ChainAccount::new(row.scope, balance)),
                    // Omitted holders keep their stored balance.
                    Err(ChainError::InvalidResponse(reason)) => {
                        tracing::warn!(
                            account = %row.scope,
                            %reason,
                            "Skipping holder with unreadable balance"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }

            tracing::debug!(
                fetched = accounts.len(),
                more = %page.more,
                "Fetched token holder page"
            );

            if page.more.is_empty() {
                break;
            }
            lower_bound = page.more;
        }

        Ok(accounts)
    }

    async fn get_active_public_key(&self, account_id: &str) -> Result<String, ChainError> {
        let account: GetAccountResponse = self
            .call(
                "get_account",
                &GetAccountRequest {
                    account_name: account_id,
                },
            )
            .await?;

        let key = account
            .active_key()
            .ok_or_else(|| ChainError::NoActiveKey(account_id.to_string()))?;

        Ok(strip_key_prefix(key, &self.config.key_prefix).to_string())
    }
}

/// Remove the chain's key prefix (exact match only).
pub fn strip_key_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

fn classify_rpc_failure(status: StatusCode, body: &[u8]) -> ChainError {
    match serde_json::from_slice::<RpcErrorBody>(body) {
        Ok(err) if err.is_missing_account() => ChainError::AccountNotFound(err.describe()),
        Ok(err) => ChainError::RpcError(format!("{status}: {}", err.describe())),
        Err(_) => ChainError::RpcError(status.to_string()),
    }
}

/// Scripted chain used by registry, snapshot and API tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    pub struct FakeChain {
        pub accounts: Vec<ChainAccount>,
        pub keys: HashMap<String, String>,
        /// Fail the holder listing as a transport error
        pub listing_down: bool,
        /// Fail every key lookup as a transport error
        pub keys_down: bool,
        pub key_lookups: AtomicUsize,
    }

    impl FakeChain {
        pub fn with_key(mut self, account_id: &str, key: &str) -> Self {
            self.keys.insert(account_id.to_string(), key.to_string());
            self
        }

        pub fn with_account(mut self, account_id: &str, balance: i64) -> Self {
            self.accounts.push(ChainAccount::new(account_id, balance));
            self
        }

        pub fn lookups(&self) -> usize {
            self.key_lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ChainClient for FakeChain {
        async fn list_accounts_with_balances(&self) -> Result<Vec<ChainAccount>, ChainError> {
            if self.listing_down {
                return Err(ChainError::RpcError("connection refused".into()));
            }
            Ok(self.accounts.clone())
        }

        async fn get_active_public_key(&self, account_id: &str) -> Result<String, ChainError> {
            self.key_lookups.fetch_add(1, Ordering::SeqCst);
            if self.keys_down {
                return Err(ChainError::RpcError("connection refused".into()));
            }
            self.keys
                .get(account_id)
                .cloned()
                .ok_or_else(|| ChainError::AccountNotFound(account_id.to_string()))
        }
    }
}
