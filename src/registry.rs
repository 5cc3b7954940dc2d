// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Registry
//!
//! Lifecycle of a registry record:
//!
//! ```text
//! Unknown --(balance query / snapshot)--> Registered --(verified /reg)--> Linked
//!                                              ^                             |
//!                                              +---- never (eth address is --+
//!                                                    only ever overwritten)
//! ```
//!
//! `excluded` is an overlay: excluded accounts look nonexistent to balance
//! queries. The stored public key is the trust anchor and is never written
//! by this module after creation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::blockchain::{signature, ChainClient, ChainError};
use crate::storage::{FieldUpdate, RegistryRecord, RegistryStore, StoreError};

/// Errors surfaced by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No record, or the record is hidden (excluded).
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),

    #[error("storage error: {0}")]
    Store(#[source] StoreError),

    #[error("{0}")]
    Validation(String),
}

impl RegistryError {
    fn from_store(account_id: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::AccountNotFound(account_id.to_string()),
            other => Self::Store(other),
        }
    }

    fn from_chain(account_id: &str, err: ChainError) -> Self {
        if err.is_missing_account() {
            Self::AccountNotFound(account_id.to_string())
        } else {
            Self::ChainUnavailable(err.to_string())
        }
    }
}

/// Message a user signs to link `account_id` to `eth_address`.
///
/// Byte-for-byte wire contract: no escaping, literal `=` and `&`.
pub fn registration_message(account_id: &str, eth_address: &str) -> String {
    format!("account={account_id}&ethaddr={eth_address}")
}

/// Registry state machine over injected store and chain capabilities.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn RegistryStore>,
    chain: Arc<dyn ChainClient>,
}

impl Registry {
    pub fn new(store: Arc<dyn RegistryStore>, chain: Arc<dyn ChainClient>) -> Self {
        Self { store, chain }
    }

    pub fn store(&self) -> &Arc<dyn RegistryStore> {
        &self.store
    }

    /// Balance of an account, lazily creating its record on first sight.
    pub async fn get_balance(&self, account_id: &str) -> Result<i64, RegistryError> {
        let record = match self.store.find(account_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => self.create_from_chain(account_id).await?,
            Err(e) => return Err(RegistryError::Store(e)),
        };

        if record.excluded {
            return Err(RegistryError::AccountNotFound(account_id.to_string()));
        }
        Ok(record.balance)
    }

    /// Registered ETH address (empty if the account is not linked yet).
    pub async fn get_eth_address(&self, account_id: &str) -> Result<String, RegistryError> {
        self.store
            .find(account_id)
            .await
            .map(|record| record.eth_address)
            .map_err(|e| RegistryError::from_store(account_id, e))
    }

    /// Link `eth_address` to `account_id` if `signature` proves key ownership.
    ///
    /// Nothing is written unless the signature verifies against the stored key.
    pub async fn register(
        &self,
        account_id: &str,
        eth_address: &str,
        signature: &str,
    ) -> Result<(), RegistryError> {
        let record = self
            .store
            .find(account_id)
            .await
            .map_err(|e| RegistryError::from_store(account_id, e))?;

        let message = registration_message(account_id, eth_address);
        if !signature::verify(&record.public_key, message.as_bytes(), signature) {
            warn!(account = %account_id, "Registration rejected: signature verification failed");
            return Err(RegistryError::InvalidSignature);
        }

        self.store
            .update_field(account_id, FieldUpdate::EthAddress(eth_address.to_string()))
            .await
            .map_err(|e| RegistryError::from_store(account_id, e))?;

        info!(account = %account_id, eth_address = %eth_address, "Registered ETH address");
        Ok(())
    }

    /// Toggle the administrative exclusion flag of an existing record.
    pub async fn set_excluded(&self, account_id: &str, excluded: bool) -> Result<(), RegistryError> {
        self.store
            .update_field(account_id, FieldUpdate::Excluded(excluded))
            .await
            .map_err(|e| RegistryError::from_store(account_id, e))?;

        info!(account = %account_id, excluded, "Updated exclusion flag");
        Ok(())
    }

    /// Create a zero-balance record from the account's on-chain key.
    ///
    /// Losing the insert race to a concurrent creator falls back to reading
    /// the winner's record.
    async fn create_from_chain(&self, account_id: &str) -> Result<RegistryRecord, RegistryError> {
        let public_key = self
            .chain
            .get_active_public_key(account_id)
            .await
            .map_err(|e| RegistryError::from_chain(account_id, e))?;

        let record = RegistryRecord::new(account_id, public_key, 0);
        match self.store.insert(&record).await {
            Ok(()) => {
                info!(account = %account_id, "Created registry record on first balance query");
                Ok(record)
            }
            Err(StoreError::Conflict(_)) => self
                .store
                .find(account_id)
                .await
                .map_err(|e| RegistryError::from_store(account_id, e)),
            Err(e) => Err(RegistryError::Store(e)),
        }
    }
}
