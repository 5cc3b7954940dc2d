// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory registry store for tests and ephemeral runs.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{FieldUpdate, RegistryRecord, RegistryStore, StoreError, StoreResult};

#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, RegistryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records (later duplicates win).
    pub fn with_records(records: impl IntoIterator<Item = RegistryRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.account_id.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait::async_trait]
impl RegistryStore for InMemoryStore {
    async fn find(&self, account_id: &str) -> StoreResult<RegistryRecord> {
        self.records
            .read()
            .await
            .get(account_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(account_id.to_string()))
    }

    async fn insert(&self, record: &RegistryRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.account_id) {
            return Err(StoreError::Conflict(record.account_id.clone()));
        }
        records.insert(record.account_id.clone(), record.clone());
        Ok(())
    }

    async fn update_field(&self, account_id: &str, update: FieldUpdate) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(account_id)
            .ok_or_else(|| StoreError::NotFound(account_id.to_string()))?;
        update.apply(record);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<RegistryRecord>> {
        let mut records: Vec<RegistryRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        Ok(records)
    }
}
