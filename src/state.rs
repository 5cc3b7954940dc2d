// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::ChainClient;
use crate::registry::Registry;
use crate::storage::RegistryStore;

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
}

impl AppState {
    pub fn new(store: Arc<dyn RegistryStore>, chain: Arc<dyn ChainClient>) -> Self {
        Self {
            registry: Registry::new(store, chain),
        }
    }
}
