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

//! Error types for message store operations.

use crate::group::GroupId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// No operation retries internally on [`StoreError::OutOfCapacity`],
/// [`StoreError::GroupOutOfCapacity`], or [`StoreError::GroupNotFound`];
/// callers decide retry policy.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Flat-store admission failed after exhausting the configured timeout
    #[error("message store was out of capacity ({capacity}), try constructing it with a larger capacity")]
    OutOfCapacity {
        /// Configured flat-store capacity.
        capacity: usize,
    },

    /// Group admission failed after exhausting the configured timeout
    #[error("message store was out of capacity ({capacity}) for group '{group_id}', try constructing it with a larger capacity")]
    GroupOutOfCapacity {
        /// Correlation key of the rejecting group.
        group_id: GroupId,
        /// Configured per-group capacity.
        capacity: usize,
    },

    /// An operation required a group that is not present
    #[error("message group '{group_id}' can not be located while attempting to {operation}")]
    GroupNotFound {
        /// Correlation key that was looked up.
        group_id: GroupId,
        /// Operation that required the group.
        operation: &'static str,
    },

    /// The lock registry can no longer be replaced
    #[error("can not change the lock registry after the store has been used")]
    LockRegistryInUse,

    /// Bookkeeping invariant broken; a bug, not a runtime condition
    #[error("internal store error: {0}")]
    Internal(String),
}
