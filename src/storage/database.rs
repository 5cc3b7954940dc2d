// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded registry database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `registry`: account_id → serialized RegistryRecord (JSON bytes)
//!
//! redb serializes write transactions, so each insert/update below is an
//! atomic single-document operation.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{FieldUpdate, RegistryRecord, RegistryStore, StoreError, StoreResult};

/// Primary table: account_id → serialized RegistryRecord (JSON bytes).
const REGISTRY: TableDefinition<&str, &[u8]> = TableDefinition::new("registry");

/// Embedded ACID registry database.
pub struct RegistryDatabase {
    db: Database,
}

impl RegistryDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(REGISTRY)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn find_sync(&self, account_id: &str) -> StoreResult<RegistryRecord> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REGISTRY)?;
        match table.get(account_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(account_id.to_string())),
        }
    }

    fn insert_sync(&self, record: &RegistryRecord) -> StoreResult<()> {
        let json = serde_json::to_vec(record)?;
        let key = record.account_id.as_str();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(REGISTRY)?;
            if table.get(key)?.is_some() {
                return Err(StoreError::Conflict(key.to_string()));
            }
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn update_field_sync(&self, account_id: &str, update: &FieldUpdate) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(REGISTRY)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(account_id)?
                    .ok_or_else(|| StoreError::NotFound(account_id.to_string()))?;
                existing.value().to_vec()
            };

            let mut record: RegistryRecord = serde_json::from_slice(&existing_bytes)?;
            if update.apply(&mut record) {
                let json = serde_json::to_vec(&record)?;
                table.insert(account_id, json.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn list_sync(&self) -> StoreResult<Vec<RegistryRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REGISTRY)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }
}

#[async_trait::async_trait]
impl RegistryStore for RegistryDatabase {
    async fn find(&self, account_id: &str) -> StoreResult<RegistryRecord> {
        self.find_sync(account_id)
    }

    async fn insert(&self, record: &RegistryRecord) -> StoreResult<()> {
        self.insert_sync(record)
    }

    async fn update_field(&self, account_id: &str, update: FieldUpdate) -> StoreResult<()> {
        self.update_field_sync(account_id, &update)
    }

    async fn list(&self) -> StoreResult<Vec<RegistryRecord>> {
        self.list_sync()
    }
}
