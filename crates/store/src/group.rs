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

//! Message group aggregate, metadata snapshots, and read-only views.

use crate::message::{Message, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Correlation key identifying a message group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Wrap a caller-supplied correlation key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Mutable aggregate of messages sharing a correlation key.
///
/// ## Invariants
/// - The group identity never changes after creation
/// - `messages` keeps insertion order; poll and peek take the oldest entry
/// - `complete` transitions false→true exactly once and never back
/// - `last_modified` is updated by every mutating operation
///
/// Mutation happens only through the store's protocol methods; outside the
/// store crate the group is visible through [`GroupView`] or owned snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageGroup {
    group_id: GroupId,
    messages: Vec<Message>,
    timestamp: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    complete: bool,
    last_released_sequence: i64,
}

impl MessageGroup {
    /// Create an empty group for `group_id`.
    pub fn new(group_id: GroupId) -> Self {
        let now = Utc::now();
        Self {
            group_id,
            messages: Vec::new(),
            timestamp: now,
            last_modified: now,
            complete: false,
            last_released_sequence: 0,
        }
    }

    /// Correlation key of this group.
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Creation time, set once.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Time of the last mutating operation.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Whether the group has been completed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Last released sequence number recorded for this group.
    pub fn last_released_sequence(&self) -> i64 {
        self.last_released_sequence
    }

    /// Number of messages currently held.
    pub fn size(&self) -> usize {
        self.messages.len()
    }

    /// Whether the group holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Oldest message by insertion order, if any.
    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub(crate) fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove the message with `id`; returns whether anything was removed.
    pub(crate) fn remove(&mut self, id: &MessageId) -> bool {
        match self.messages.iter().position(|m| m.id() == id) {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub(crate) fn set_last_released_sequence(&mut self, sequence_number: i64) {
        self.last_released_sequence = sequence_number;
    }

    pub(crate) fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Read-only snapshot of a group's bookkeeping fields.
///
/// Captured under a single read acquisition, so the id list and the
/// timestamps always belong to the same moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadata {
    group_id: GroupId,
    message_ids: Vec<MessageId>,
    timestamp: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    complete: bool,
    last_released_sequence: i64,
}

impl GroupMetadata {
    /// Correlation key of the group.
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Ids of the held messages, in insertion order.
    pub fn message_ids(&self) -> &[MessageId] {
        &self.message_ids
    }

    /// Creation time of the group.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Time of the last mutating operation.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Whether the group has been completed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Last released sequence number.
    pub fn last_released_sequence(&self) -> i64 {
        self.last_released_sequence
    }

    /// Number of messages held at snapshot time.
    pub fn size(&self) -> usize {
        self.message_ids.len()
    }
}

impl From<&MessageGroup> for GroupMetadata {
    fn from(group: &MessageGroup) -> Self {
        Self {
            group_id: group.group_id.clone(),
            message_ids: group.messages.iter().map(|m| m.id().clone()).collect(),
            timestamp: group.timestamp,
            last_modified: group.last_modified,
            complete: group.complete,
            last_released_sequence: group.last_released_sequence,
        }
    }
}

/// Read-only handle over a message group.
///
/// A *live* view shares the stored group, so later mutations made through
/// the store are visible. A *detached* view wraps a private snapshot that no
/// store operation can reach. Either way, the handle exposes no mutators.
#[derive(Debug, Clone)]
pub struct GroupView {
    group_id: GroupId,
    inner: Arc<RwLock<MessageGroup>>,
}

impl GroupView {
    pub(crate) fn live(group_id: GroupId, inner: Arc<RwLock<MessageGroup>>) -> Self {
        Self { group_id, inner }
    }

    pub(crate) fn detached(group: MessageGroup) -> Self {
        Self {
            group_id: group.group_id().clone(),
            inner: Arc::new(RwLock::new(group)),
        }
    }

    /// Correlation key of the viewed group.
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Number of messages currently held.
    pub async fn size(&self) -> usize {
        self.inner.read().await.size()
    }

    /// Whether the group holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Whether the group has been completed.
    pub async fn is_complete(&self) -> bool {
        self.inner.read().await.is_complete()
    }

    /// Creation time of the group.
    pub async fn timestamp(&self) -> DateTime<Utc> {
        self.inner.read().await.timestamp()
    }

    /// Time of the last mutating operation.
    pub async fn last_modified(&self) -> DateTime<Utc> {
        self.inner.read().await.last_modified()
    }

    /// Last released sequence number.
    pub async fn last_released_sequence(&self) -> i64 {
        self.inner.read().await.last_released_sequence()
    }

    /// Owned copy of the messages, in insertion order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.read().await.messages().to_vec()
    }

    /// Oldest message by insertion order, if any. Non-destructive.
    pub async fn first_message(&self) -> Option<Message> {
        self.inner.read().await.first().cloned()
    }

    /// Consistent metadata snapshot, taken under one read acquisition.
    pub async fn metadata(&self) -> GroupMetadata {
        GroupMetadata::from(&*self.inner.read().await)
    }

    /// Owned deep copy of the whole group.
    pub async fn snapshot(&self) -> MessageGroup {
        self.inner.read().await.clone()
    }
}
