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

//! In-memory message store implementation.
//!
//! ## Purpose
//! HashMap-based implementation of [`MessageStore`] and
//! [`MessageGroupStore`] enforcing the configured capacities.
//!
//! ## Limitations
//! - Not persistent (messages lost on restart)
//! - Not distributed (single process only)

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::gate::{Capacity, CapacityGate};
use crate::group::{GroupId, GroupMetadata, GroupView, MessageGroup};
use crate::message::{Message, MessageId};
use crate::store::{MessageGroupStore, MessageStore};
use async_trait::async_trait;
use corral_locks::{KeyedLock, LockRegistry, MemoryLockRegistry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

type SharedGroup = Arc<RwLock<MessageGroup>>;

/// In-memory bounded message store.
///
/// ## Example
/// ```rust
/// use corral_store::{Capacity, MemoryMessageStore, Message, MessageStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryMessageStore::bounded(Capacity::bounded(100), Capacity::bounded(10));
///
/// let message = store.add_message(Message::new(b"payload".to_vec())).await?;
/// assert!(store.get_message(message.id()).await.is_some());
/// # Ok(())
/// # }
/// ```
pub struct MemoryMessageStore {
    id_to_message: RwLock<HashMap<MessageId, Message>>,
    groups: RwLock<HashMap<GroupId, SharedGroup>>,
    group_gates: RwLock<HashMap<GroupId, Arc<CapacityGate>>>,
    individual_gate: CapacityGate,
    config: StoreConfig,
    lock_registry: Arc<dyn LockRegistry<GroupId>>,
    used: AtomicBool,
}

impl MemoryMessageStore {
    /// Create an unbounded store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store bounded by the given flat and per-group capacities.
    pub fn bounded(individual_capacity: Capacity, group_capacity: Capacity) -> Self {
        Self::with_config(
            StoreConfig::default()
                .with_individual_capacity(individual_capacity)
                .with_group_capacity(group_capacity),
        )
    }

    /// Create a store from a configuration, with the default process-local
    /// lock registry.
    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_config_and_registry(config, Arc::new(MemoryLockRegistry::<GroupId>::new()))
    }

    /// Create a store from a configuration and a caller-supplied lock
    /// registry.
    pub fn with_config_and_registry(
        config: StoreConfig,
        lock_registry: Arc<dyn LockRegistry<GroupId>>,
    ) -> Self {
        Self {
            id_to_message: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            group_gates: RwLock::new(HashMap::new()),
            individual_gate: CapacityGate::new(config.individual_capacity),
            config,
            lock_registry,
            used: AtomicBool::new(false),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Switch group reads between live views and detached snapshots.
    pub fn set_copy_on_get(&mut self, copy_on_get: bool) {
        self.config.copy_on_get = copy_on_get;
    }

    /// Replace the lock registry.
    ///
    /// ## Errors
    /// - [`StoreError::LockRegistryInUse`]: the store has already been used;
    ///   swapping the registry now would break the equal-key-same-lock
    ///   guarantee for in-flight groups
    pub fn set_lock_registry(
        &mut self,
        lock_registry: Arc<dyn LockRegistry<GroupId>>,
    ) -> StoreResult<()> {
        if self.used.load(Ordering::Acquire) {
            return Err(StoreError::LockRegistryInUse);
        }
        self.lock_registry = lock_registry;
        Ok(())
    }

    fn mark_used(&self) {
        self.used.store(true, Ordering::Release);
    }

    async fn obtain_lock(&self, group_id: &GroupId) -> KeyedLock {
        self.lock_registry.obtain(group_id).await
    }

    async fn required_group(
        &self,
        group_id: &GroupId,
        operation: &'static str,
    ) -> StoreResult<SharedGroup> {
        self.groups
            .read()
            .await
            .get(group_id)
            .cloned()
            .ok_or_else(|| StoreError::GroupNotFound {
                group_id: group_id.clone(),
                operation,
            })
    }

    async fn group_gate(&self, group_id: &GroupId) -> StoreResult<Arc<CapacityGate>> {
        self.group_gates
            .read()
            .await
            .get(group_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::Internal(format!("no capacity gate for group '{group_id}'"))
            })
    }

    fn group_capacity_limit(&self) -> usize {
        self.config.group_capacity.limit().unwrap_or(0)
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn add_message(&self, message: Message) -> StoreResult<Message> {
        self.mark_used();
        // Admission happens before the index write: re-adding an existing id
        // consumes a fresh permit even though the index size is unchanged.
        if !self
            .individual_gate
            .try_acquire(self.config.admission_timeout)
            .await
        {
            let capacity = self.config.individual_capacity.limit().unwrap_or(0);
            warn!(message_id = %message.id(), capacity, "message rejected: store out of capacity");
            return Err(StoreError::OutOfCapacity { capacity });
        }
        self.id_to_message
            .write()
            .await
            .insert(message.id().clone(), message.clone());
        Ok(message)
    }

    async fn get_message(&self, id: &MessageId) -> Option<Message> {
        self.id_to_message.read().await.get(id).cloned()
    }

    async fn remove_message(&self, id: &MessageId) -> Option<Message> {
        let removed = self.id_to_message.write().await.remove(id);
        if removed.is_some() {
            self.individual_gate.release();
        }
        removed
    }

    async fn message_count(&self) -> usize {
        self.id_to_message.read().await.len()
    }
}

#[async_trait]
impl MessageGroupStore for MemoryMessageStore {
    async fn get_message_group(&self, group_id: &GroupId) -> GroupView {
        let group = self.groups.read().await.get(group_id).cloned();
        match group {
            None => GroupView::detached(MessageGroup::new(group_id.clone())),
            Some(group) => {
                if self.config.copy_on_get {
                    // A copy taken under the keyed lock can never observe a
                    // half-applied mutation.
                    let lock = self.obtain_lock(group_id).await;
                    let _guard = lock.lock().await;
                    let snapshot = group.read().await.clone();
                    GroupView::detached(snapshot)
                } else {
                    GroupView::live(group_id.clone(), group)
                }
            }
        }
    }

    async fn add_message_to_group(
        &self,
        group_id: &GroupId,
        message: Message,
    ) -> StoreResult<GroupView> {
        self.mark_used();
        let lock = self.obtain_lock(group_id).await;
        let mut guard = lock.lock().await;

        let existing = self.groups.read().await.get(group_id).cloned();
        let group = match existing {
            None => {
                debug!(group_id = %group_id, "creating message group");
                // Publish-if-absent; the first publisher wins if a race
                // slips past the keyed lock.
                let group = {
                    let mut groups = self.groups.write().await;
                    groups
                        .entry(group_id.clone())
                        .or_insert_with(|| {
                            Arc::new(RwLock::new(MessageGroup::new(group_id.clone())))
                        })
                        .clone()
                };
                let gate = {
                    let mut gates = self.group_gates.write().await;
                    gates
                        .entry(group_id.clone())
                        .or_insert_with(|| Arc::new(CapacityGate::new(self.config.group_capacity)))
                        .clone()
                };
                // The incoming message occupies a slot from the moment the
                // group exists; the gate is fresh, so this never blocks.
                gate.force_acquire();
                group
            }
            Some(group) => {
                let gate = self.group_gate(group_id).await?;
                // Waiting for a free slot must not stall the releases and
                // reads that would produce one, so the keyed lock is dropped
                // for the wait and re-acquired afterwards.
                drop(guard);
                if !gate.try_acquire(self.config.admission_timeout).await {
                    let capacity = self.group_capacity_limit();
                    warn!(group_id = %group_id, capacity, "message rejected: group out of capacity");
                    return Err(StoreError::GroupOutOfCapacity {
                        group_id: group_id.clone(),
                        capacity,
                    });
                }
                guard = lock.lock().await;
                group
            }
        };

        {
            let mut group = group.write().await;
            group.add(message);
            group.touch();
        }
        drop(guard);
        Ok(GroupView::live(group_id.clone(), group))
    }

    async fn remove_message_group(&self, group_id: &GroupId) -> StoreResult<()> {
        let lock = self.obtain_lock(group_id).await;
        let _guard = lock.lock().await;

        let removed = self.groups.write().await.remove(group_id);
        if removed.is_some() {
            let gate = self
                .group_gates
                .write()
                .await
                .remove(group_id)
                .ok_or_else(|| {
                    StoreError::Internal(format!("no capacity gate for group '{group_id}'"))
                })?;
            // Bookkeeping reset: the full configured capacity is returned,
            // not the count the group actually held.
            gate.release_many(self.group_capacity_limit());
            debug!(group_id = %group_id, "removed message group");
        }
        Ok(())
    }

    async fn remove_message_from_group(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
    ) -> StoreResult<GroupView> {
        let lock = self.obtain_lock(group_id).await;
        let _guard = lock.lock().await;

        let group = self
            .required_group(group_id, "remove a message from the message group")
            .await?;
        let gate = self.group_gate(group_id).await?;
        {
            let mut group = group.write().await;
            if group.remove(message_id) {
                gate.release();
                group.touch();
            }
        }
        Ok(GroupView::live(group_id.clone(), group))
    }

    async fn remove_messages_from_group(
        &self,
        group_id: &GroupId,
        message_ids: &[MessageId],
    ) -> StoreResult<()> {
        let lock = self.obtain_lock(group_id).await;
        let _guard = lock.lock().await;

        let group = self
            .required_group(group_id, "remove messages from the message group")
            .await?;
        let gate = self.group_gate(group_id).await?;

        let mut group = group.write().await;
        let mut modified = false;
        for message_id in message_ids {
            if group.remove(message_id) {
                gate.release();
                modified = true;
            }
        }
        if modified {
            group.touch();
        }
        Ok(())
    }

    async fn clear_message_group(&self, group_id: &GroupId) -> StoreResult<()> {
        let lock = self.obtain_lock(group_id).await;
        let _guard = lock.lock().await;

        let group = self
            .required_group(group_id, "clear the message group")
            .await?;
        let gate = self.group_gate(group_id).await?;
        {
            let mut group = group.write().await;
            group.clear();
            group.touch();
        }
        // Same bookkeeping reset as group removal; the group itself stays.
        gate.release_many(self.group_capacity_limit());
        Ok(())
    }

    async fn set_last_released_sequence(
        &self,
        group_id: &GroupId,
        sequence_number: i64,
    ) -> StoreResult<()> {
        let lock = self.obtain_lock(group_id).await;
        let _guard = lock.lock().await;

        let group = self
            .required_group(group_id, "set the last released sequence number")
            .await?;
        let mut group = group.write().await;
        group.set_last_released_sequence(sequence_number);
        group.touch();
        Ok(())
    }

    async fn complete_group(&self, group_id: &GroupId) -> StoreResult<()> {
        let lock = self.obtain_lock(group_id).await;
        let _guard = lock.lock().await;

        let group = self
            .required_group(group_id, "complete the message group")
            .await?;
        let mut group = group.write().await;
        group.mark_complete();
        group.touch();
        Ok(())
    }

    async fn poll_message_from_group(&self, group_id: &GroupId) -> StoreResult<Option<Message>> {
        let first = self
            .get_message_group(group_id)
            .await
            .first_message()
            .await;
        match first {
            None => Ok(None),
            Some(message) => {
                self.remove_messages_from_group(group_id, std::slice::from_ref(message.id()))
                    .await?;
                Ok(Some(message))
            }
        }
    }

    async fn get_one_message_from_group(&self, group_id: &GroupId) -> Option<Message> {
        self.get_message_group(group_id).await.first_message().await
    }

    async fn message_group_size(&self, group_id: &GroupId) -> usize {
        self.get_message_group(group_id).await.size().await
    }

    async fn group_metadata(&self, group_id: &GroupId) -> GroupMetadata {
        self.get_message_group(group_id).await.metadata().await
    }

    async fn message_groups(&self) -> Vec<GroupView> {
        self.groups
            .read()
            .await
            .iter()
            .map(|(group_id, group)| GroupView::live(group_id.clone(), group.clone()))
            .collect()
    }

    async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    async fn message_count_for_all_groups(&self) -> usize {
        let groups: Vec<SharedGroup> = self.groups.read().await.values().cloned().collect();
        let mut count = 0;
        for group in groups {
            count += group.read().await.size();
        }
        count
    }
}
