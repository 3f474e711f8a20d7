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

//! Store configuration.

use crate::gate::{AdmissionTimeout, Capacity};
use serde::{Deserialize, Serialize};

/// Configuration for a message store.
///
/// ## Defaults
/// - Flat and group capacities: unbounded
/// - Admission timeout: fail immediately when full
/// - `copy_on_get`: off (group reads return live views)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Capacity of the flat message index.
    pub individual_capacity: Capacity,
    /// Capacity applied to every message group.
    pub group_capacity: Capacity,
    /// How long admission may wait for a free slot, on both indexes.
    pub admission_timeout: AdmissionTimeout,
    /// Return detached snapshots instead of live views from group reads.
    /// Trades allocation cost for read isolation.
    pub copy_on_get: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            individual_capacity: Capacity::Unbounded,
            group_capacity: Capacity::Unbounded,
            admission_timeout: AdmissionTimeout::NoWait,
            copy_on_get: false,
        }
    }
}

impl StoreConfig {
    /// Configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flat-index capacity.
    pub fn with_individual_capacity(mut self, capacity: Capacity) -> Self {
        self.individual_capacity = capacity;
        self
    }

    /// Set the per-group capacity.
    pub fn with_group_capacity(mut self, capacity: Capacity) -> Self {
        self.group_capacity = capacity;
        self
    }

    /// Set the same capacity for the flat index and every group.
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.individual_capacity = capacity;
        self.group_capacity = capacity;
        self
    }

    /// Set the admission timeout.
    pub fn with_admission_timeout(mut self, timeout: AdmissionTimeout) -> Self {
        self.admission_timeout = timeout;
        self
    }

    /// Enable or disable copy-on-get reads.
    pub fn with_copy_on_get(mut self, copy_on_get: bool) -> Self {
        self.copy_on_get = copy_on_get;
        self
    }
}
