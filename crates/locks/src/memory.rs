// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Corral.
//
// Corral is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Corral is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Corral. If not, see <https://www.gnu.org/licenses/>.

//! In-memory lock registry implementation.

use crate::{KeyedLock, LockRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Process-local lock registry.
///
/// ## Purpose
/// Default registry for single-process deployments: keeps one lock per
/// distinct key seen in a `HashMap` guarded by an `RwLock`.
///
/// ## Limitations
/// - Not distributed (single process only)
/// - Entries are never evicted; one lock is retained per distinct key for
///   the lifetime of the registry
// TODO: compact entries whose locks have no outside holders (weak references
// would let dead-group locks be dropped).
pub struct MemoryLockRegistry<K> {
    locks: RwLock<HashMap<K, KeyedLock>>,
}

impl<K> MemoryLockRegistry<K>
where
    K: Eq + Hash,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }
}

impl<K> Default for MemoryLockRegistry<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K> LockRegistry<K> for MemoryLockRegistry<K>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    async fn obtain(&self, key: &K) -> KeyedLock {
        // Fast path: the key has been seen before.
        if let Some(lock) = self.locks.read().await.get(key) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
