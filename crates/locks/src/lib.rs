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

//! # Corral Keyed Locks
//!
//! ## Purpose
//! Provides lock registries that hand out one lock per distinct key, so that
//! operations sharing a key serialize against each other while operations on
//! different keys proceed independently.
//!
//! ## Architecture Context
//! This crate is used by the message store to serialize mutations of a
//! message group: every group-level operation obtains the lock for its
//! correlation key before touching the group. Any component that needs
//! per-key mutual exclusion can reuse it.
//!
//! ## Design Decisions
//! - **One lock per key**: equal keys resolve to the pointer-identical
//!   `Arc<Mutex<()>>`, which is the equivalence the serialization guarantee
//!   rests on
//! - **Cancel-safe acquisition**: locking is `lock().await` on a Tokio mutex;
//!   a cancelled wait never leaves the mutex held
//! - **Registry as an explicit component**: registries are constructed at
//!   init time and passed by reference into their consumers, never reached
//!   through a global
//!
//! ## Examples
//!
//! ```rust
//! use corral_locks::{LockRegistry, MemoryLockRegistry};
//!
//! # async fn example() {
//! let registry: MemoryLockRegistry<String> = MemoryLockRegistry::new();
//!
//! let lock = registry.obtain(&"order-42".to_string()).await;
//! let guard = lock.lock().await;
//! // ... mutate state keyed by "order-42" ...
//! drop(guard);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;
mod registry;

pub use memory::MemoryLockRegistry;
pub use registry::{KeyedLock, LockRegistry};
