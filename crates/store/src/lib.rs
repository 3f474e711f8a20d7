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

//! # Corral Message Store
//!
//! ## Purpose
//! A bounded, concurrent, in-process store for transient messages and message
//! groups: the buffering substrate a messaging pipeline uses to hold messages
//! awaiting correlation, aggregation, or resequencing before release
//! downstream.
//!
//! ## Architecture Context
//! The store maintains two coupled structures:
//!
//! - a **flat index** mapping message id → message, gated by one shared
//!   capacity gate
//! - a **group store** mapping correlation key → message group, each group
//!   gated by its own capacity gate, with all group mutations serialized
//!   per key through a lock registry
//!
//! Producers add messages (flat) or add messages to groups (keyed by a
//! correlation key); consumers poll, peek, iterate, and remove, returning
//! capacity to the gates as they go.
//!
//! ## Design Decisions
//! - **Admission before mutation**: every write first acquires a capacity
//!   permit; the configured timeout decides whether exhaustion waits or fails
//! - **Capacity waits never hold the group lock**: `add_message_to_group`
//!   releases the keyed lock before waiting for a free slot and re-acquires
//!   it afterwards, so a group at capacity cannot stall the removals that
//!   would free it
//! - **Read views, not live aliases**: group reads return [`GroupView`]
//!   handles that expose no mutators; `copy_on_get` selects a detached
//!   snapshot instead of a live view
//!
//! ## Key Components
//!
//! - [`MessageStore`] / [`MessageGroupStore`]: the store traits; external
//!   persistence-backed variants implement the same contracts
//! - [`MemoryMessageStore`]: the in-memory implementation
//! - [`CapacityGate`]: semaphore-like admission primitive with an unlimited
//!   mode
//! - [`StoreConfig`]: capacities, admission timeout, and read mode
//! - [`StoreError`]: error taxonomy for all operations
//!
//! ## Examples
//!
//! ```rust
//! use corral_store::{
//!     Capacity, GroupId, MemoryMessageStore, Message, MessageGroupStore, StoreConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryMessageStore::with_config(
//!     StoreConfig::default().with_group_capacity(Capacity::bounded(100)),
//! );
//!
//! let group_id = GroupId::new("order-42");
//! store
//!     .add_message_to_group(&group_id, Message::new(b"first".to_vec()))
//!     .await?;
//! assert_eq!(store.message_group_size(&group_id).await, 1);
//!
//! let polled = store.poll_message_from_group(&group_id).await?;
//! assert!(polled.is_some());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod gate;
mod group;
mod memory;
mod message;
mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use gate::{AdmissionTimeout, Capacity, CapacityGate};
pub use group::{GroupId, GroupMetadata, GroupView, MessageGroup};
pub use memory::MemoryMessageStore;
pub use message::{Message, MessageId};
pub use store::{MessageGroupStore, MessageStore};
