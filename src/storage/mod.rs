// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Registry Storage
//!
//! One document per chain account, keyed by account id:
//!
//! ```json
//! {"_id": "alice", "pubkey": "6Mn...", "balance": 123400, "ethaddr": "", "exclude": false}
//! ```
//!
//! Every mutation is a single-document operation. Backends:
//!
//! - [`RegistryDatabase`] - embedded redb database (production)
//! - [`InMemoryStore`] - `HashMap` behind a tokio `RwLock` (tests, ephemeral runs)
//!
//! No update touches the public key once a record exists.

pub mod database;
pub mod memory;

pub use database::RegistryDatabase;
pub use memory::InMemoryStore;

use serde::{Deserialize, Serialize};

/// Registry document for one chain account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Chain account name
    #[serde(rename = "_id")]
    pub account_id: String,
    /// Active key at first sight, chain prefix removed
    #[serde(rename = "pubkey", default)]
    pub public_key: String,
    /// Last snapshotted balance in minor units
    pub balance: i64,
    /// Registered ERC-20 payout address (empty until registration)
    #[serde(rename = "ethaddr", default)]
    pub eth_address: String,
    /// Administratively excluded from payouts
    #[serde(rename = "exclude", default)]
    pub excluded: bool,
}

impl RegistryRecord {
    /// A freshly discovered account: no ETH address, not excluded.
    pub fn new(account_id: impl Into<String>, public_key: impl Into<String>, balance: i64) -> Self {
        Self {
            account_id: account_id.into(),
            public_key: public_key.into(),
            balance,
            eth_address: String::new(),
            excluded: false,
        }
    }
}

/// Single-field update applied atomically to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Balance(i64),
    EthAddress(String),
    Excluded(bool),
}

impl FieldUpdate {
    /// Apply the update in place. Returns whether the record changed.
    pub fn apply(&self, record: &mut RegistryRecord) -> bool {
        match self {
            Self::Balance(balance) => replace(&mut record.balance, *balance),
            Self::EthAddress(address) => replace(&mut record.eth_address, address.clone()),
            Self::Excluded(excluded) => replace(&mut record.excluded, *excluded),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Error type for registry storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Document-store capability used by the registry and the snapshot job.
#[async_trait::async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load a record, `NotFound` if absent.
    async fn find(&self, account_id: &str) -> StoreResult<RegistryRecord>;

    /// Create a record, `Conflict` if the account id is taken.
    async fn insert(&self, record: &RegistryRecord) -> StoreResult<()>;

    /// Apply one field update, `NotFound` if absent.
    async fn update_field(&self, account_id: &str, update: FieldUpdate) -> StoreResult<()>;

    /// All records ordered by account id.
    async fn list(&self) -> StoreResult<Vec<RegistryRecord>>;
}
