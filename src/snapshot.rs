// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Snapshot
//!
//! One-shot job that copies on-chain YTT balances into the registry.
//!
//! ## Strategy
//!
//! 1. List every token holder and its balance from the chain. A failure here
//!    aborts the run.
//! 2. For each holder, independently:
//!    - no record: fetch the active key (empty on failure) and create one
//!    - record exists: update the balance only
//! 3. Per-account failures are logged and counted; the batch continues.
//!
//! Re-running with identical input is a no-op. The public key and registered
//! ETH address of an existing record are never touched.

use std::sync::Arc;

use tracing::{info, warn};

use crate::blockchain::{ChainAccount, ChainClient};
use crate::registry::RegistryError;
use crate::storage::{FieldUpdate, RegistryRecord, RegistryStore, StoreError, StoreResult};

/// Outcome counters of one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Accounts seen on chain
    pub total: usize,
    /// New records
    pub created: usize,
    /// Existing records whose balance was refreshed
    pub updated: usize,
    /// Records stored without a public key
    pub missing_keys: usize,
    /// Accounts skipped because of a store failure
    pub failed: usize,
}

enum Outcome {
    Created { key_missing: bool },
    Updated,
}

/// Merges chain balances into the registry store.
pub struct SnapshotReconciler {
    store: Arc<dyn RegistryStore>,
    chain: Arc<dyn ChainClient>,
}

impl SnapshotReconciler {
    pub fn new(store: Arc<dyn RegistryStore>, chain: Arc<dyn ChainClient>) -> Self {
        Self { store, chain }
    }

    /// List holders from the chain and reconcile them.
    pub async fn run(&self) -> Result<SnapshotReport, RegistryError> {
        info!("Starting snapshot of chain balances");

        let accounts = self
            .chain
            .list_accounts_with_balances()
            .await
            .map_err(|e| RegistryError::ChainUnavailable(e.to_string()))?;

        Ok(self.reconcile(&accounts).await)
    }

    /// Upsert every `(account, balance)` pair; never aborts on a single account.
    pub async fn reconcile(&self, accounts: &[ChainAccount]) -> SnapshotReport {
        let mut report = SnapshotReport {
            total: accounts.len(),
            ..SnapshotReport::default()
        };

        for (index, account) in accounts.iter().enumerate() {
            match self.reconcile_one(account).await {
                Ok(Outcome::Created { key_missing }) => {
                    report.created += 1;
                    if key_missing {
                        report.missing_keys += 1;
                    }
                    info!(
                        index,
                        account = %account.account_id,
                        balance = account.balance,
                        "Snapshot: registered account"
                    );
                }
                Ok(Outcome::Updated) => {
                    report.updated += 1;
                    info!(
                        index,
                        account = %account.account_id,
                        balance = account.balance,
                        "Snapshot: refreshed balance"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        index,
                        account = %account.account_id,
                        balance = account.balance,
                        error = %e,
                        "Snapshot: failed to store account"
                    );
                }
            }
        }

        info!(
            total = report.total,
            created = report.created,
            updated = report.updated,
            missing_keys = report.missing_keys,
            failed = report.failed,
            "Snapshot complete"
        );

        report
    }

    async fn reconcile_one(&self, account: &ChainAccount) -> StoreResult<Outcome> {
        match self.store.find(&account.account_id).await {
            Ok(_) => self.refresh(account).await,
            Err(StoreError::NotFound(_)) => {
                let public_key = self.fetch_key(&account.account_id).await;
                let key_missing = public_key.is_empty();
                let record = RegistryRecord::new(&account.account_id, public_key, account.balance);

                match self.store.insert(&record).await {
                    Ok(()) => Ok(Outcome::Created { key_missing }),
                    // Created concurrently (lazy balance query): treat as existing.
                    Err(StoreError::Conflict(_)) => self.refresh(account).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh(&self, account: &ChainAccount) -> StoreResult<Outcome> {
        self.store
            .update_field(&account.account_id, FieldUpdate::Balance(account.balance))
            .await?;
        Ok(Outcome::Updated)
    }

    /// Active key of the account, or empty if the chain cannot provide one.
    async fn fetch_key(&self, account_id: &str) -> String {
        match self.chain.get_active_public_key(account_id).await {
            Ok(key) => key,
            Err(e) => {
                warn!(account = %account_id, error = %e, "Snapshot: failed to get public key");
                String::new()
            }
        }
    }
}
