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

//! Lock registry trait.

use async_trait::async_trait;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lock handle associated with a key.
///
/// Holders acquire it with `lock().await`; the acquisition is cancel-safe,
/// so a dropped wait never leaves the mutex held. The guard releases the
/// lock on drop, including on every error path.
pub type KeyedLock = Arc<Mutex<()>>;

/// Trait for registries that map keys to locks.
///
/// ## Purpose
/// Serializes operations that share a key: two `obtain` calls with equal keys
/// must yield locks that serialize against one another (the same `Arc`, or an
/// equivalence class mapped 1:1 to the key).
///
/// ## Example
/// ```rust,ignore
/// let lock = registry.obtain(&group_id).await;
/// let _guard = lock.lock().await;
/// // ... the critical section for this key ...
/// ```
#[async_trait]
pub trait LockRegistry<K>: Send + Sync
where
    K: Eq + Hash + Send + Sync,
{
    /// Return the lock associated with `key`.
    ///
    /// ## Behavior
    /// - Equal keys yield the same lock instance
    /// - Obtaining never blocks on other holders; only `lock().await` on the
    ///   returned handle does
    async fn obtain(&self, key: &K) -> KeyedLock;
}
