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

//! Store traits.
//!
//! [`MemoryMessageStore`](crate::MemoryMessageStore) implements both traits
//! in-process; persistence-backed variants live outside this crate and must
//! honor the same contracts.

use crate::error::StoreResult;
use crate::group::{GroupId, GroupMetadata, GroupView};
use crate::message::{Message, MessageId};
use async_trait::async_trait;

/// Flat message index keyed by message id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store a message.
    ///
    /// ## Behavior
    /// Admission through the flat capacity gate happens before the index
    /// write, so re-adding an existing id consumes a fresh permit even
    /// though the index size does not change. The write itself is last
    /// write wins.
    ///
    /// ## Errors
    /// - [`StoreError::OutOfCapacity`](crate::StoreError::OutOfCapacity):
    ///   no slot freed up within the configured admission timeout
    async fn add_message(&self, message: Message) -> StoreResult<Message>;

    /// Look up a message by id.
    async fn get_message(&self, id: &MessageId) -> Option<Message>;

    /// Remove a message by id, returning it if it was present.
    ///
    /// A removal that found something returns one permit to the flat gate;
    /// removing an absent id releases nothing.
    async fn remove_message(&self, id: &MessageId) -> Option<Message>;

    /// Number of messages in the flat index.
    async fn message_count(&self) -> usize;
}

/// Grouped message store keyed by correlation key.
///
/// ## Group lifecycle
/// absent → present(incomplete) → present(complete); completion is one-way.
/// A group is created lazily by the first
/// [`add_message_to_group`](MessageGroupStore::add_message_to_group) for an
/// unseen key and destroyed only by
/// [`remove_message_group`](MessageGroupStore::remove_message_group).
///
/// ## Concurrency
/// Mutations of one group serialize through its keyed lock; operations on
/// distinct groups never block each other, including while one of them is
/// waiting for capacity.
#[async_trait]
pub trait MessageGroupStore: Send + Sync {
    /// Return a view of the group, or of a transient empty group when the
    /// key is unknown (the empty group is not persisted).
    ///
    /// With `copy_on_get` the view is a detached snapshot taken under the
    /// keyed lock; otherwise it is a live read-only view of the stored
    /// group.
    async fn get_message_group(&self, group_id: &GroupId) -> GroupView;

    /// Add a message to the group, creating the group if needed.
    ///
    /// ## Behavior
    /// For an existing group the keyed lock is released for the duration of
    /// the capacity wait and re-acquired before the append, so a group at
    /// capacity never stalls the removals that would free it. Appends to the
    /// same group never interleave; adds to distinct groups proceed
    /// independently.
    ///
    /// ## Errors
    /// - [`StoreError::GroupOutOfCapacity`](crate::StoreError::GroupOutOfCapacity):
    ///   the group's gate admitted nothing within the configured timeout
    async fn add_message_to_group(
        &self,
        group_id: &GroupId,
        message: Message,
    ) -> StoreResult<GroupView>;

    /// Delete the group and its capacity gate. Removing an absent group is
    /// a silent no-op.
    ///
    /// The gate's permits are restored to the full configured group
    /// capacity, not to the count the group actually held.
    async fn remove_message_group(&self, group_id: &GroupId) -> StoreResult<()>;

    /// Remove a single message from the group and return the group.
    ///
    /// Singular form retained for callers migrating from the
    /// one-message-at-a-time contract; new code should prefer
    /// [`remove_messages_from_group`](MessageGroupStore::remove_messages_from_group).
    ///
    /// ## Errors
    /// - [`StoreError::GroupNotFound`](crate::StoreError::GroupNotFound)
    async fn remove_message_from_group(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
    ) -> StoreResult<GroupView>;

    /// Remove each listed message from the group, releasing one permit per
    /// message actually removed. The group's last-modified time is updated
    /// only if at least one removal occurred.
    ///
    /// ## Errors
    /// - [`StoreError::GroupNotFound`](crate::StoreError::GroupNotFound)
    async fn remove_messages_from_group(
        &self,
        group_id: &GroupId,
        message_ids: &[MessageId],
    ) -> StoreResult<()>;

    /// Empty the group without deleting it, restoring its gate to the full
    /// configured group capacity.
    ///
    /// ## Errors
    /// - [`StoreError::GroupNotFound`](crate::StoreError::GroupNotFound)
    async fn clear_message_group(&self, group_id: &GroupId) -> StoreResult<()>;

    /// Record the last released sequence number for the group.
    ///
    /// ## Errors
    /// - [`StoreError::GroupNotFound`](crate::StoreError::GroupNotFound)
    async fn set_last_released_sequence(
        &self,
        group_id: &GroupId,
        sequence_number: i64,
    ) -> StoreResult<()>;

    /// Mark the group complete. One-way; there is no way back to
    /// incomplete under the same key.
    ///
    /// ## Errors
    /// - [`StoreError::GroupNotFound`](crate::StoreError::GroupNotFound)
    async fn complete_group(&self, group_id: &GroupId) -> StoreResult<()>;

    /// Destructively take the oldest message of the group, or `None` when
    /// the group is empty or absent. Removal goes through the same path as
    /// [`remove_messages_from_group`](MessageGroupStore::remove_messages_from_group),
    /// so the capacity and lock invariants hold identically.
    async fn poll_message_from_group(&self, group_id: &GroupId) -> StoreResult<Option<Message>>;

    /// Non-destructive peek at the oldest message of the group, or `None`
    /// when the group is empty or absent. Idempotent.
    async fn get_one_message_from_group(&self, group_id: &GroupId) -> Option<Message>;

    /// Number of messages in the group; `0` for an absent group.
    async fn message_group_size(&self, group_id: &GroupId) -> usize;

    /// Consistent metadata snapshot of the group.
    async fn group_metadata(&self, group_id: &GroupId) -> GroupMetadata;

    /// Snapshot of the currently known groups. Membership changes after the
    /// call are not reflected in the returned snapshot.
    async fn message_groups(&self) -> Vec<GroupView>;

    /// Number of groups currently present.
    async fn group_count(&self) -> usize;

    /// Total number of messages held across all groups.
    async fn message_count_for_all_groups(&self) -> usize;
}
