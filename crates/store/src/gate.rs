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

//! Capacity admission primitives.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Upper bound on how many messages a structure may hold.
///
/// A tagged variant rather than a sentinel integer, so "unlimited" can never
/// take part in capacity arithmetic by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    /// Capacity is fixed and enforced.
    Bounded(NonZeroUsize),
    /// Capacity is unlimited; admission always succeeds.
    Unbounded,
}

impl Capacity {
    /// Bounded capacity of `limit` slots; `0` means unbounded.
    pub fn bounded(limit: usize) -> Self {
        match NonZeroUsize::new(limit) {
            Some(limit) => Self::Bounded(limit),
            None => Self::Unbounded,
        }
    }

    /// Map a signed limit to a capacity: any value `<= 0` means unbounded.
    pub fn from_limit(limit: i64) -> Self {
        if limit <= 0 {
            Self::Unbounded
        } else {
            Self::bounded(limit as usize)
        }
    }

    /// Configured limit, or `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Bounded(limit) => Some(limit.get()),
            Self::Unbounded => None,
        }
    }

    /// Whether admission is unlimited.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

/// How long an admission attempt may wait for a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdmissionTimeout {
    /// Fail immediately when no slot is free.
    #[default]
    NoWait,
    /// Wait up to the given duration for a release.
    Wait(Duration),
    /// Wait until a slot frees up, however long that takes.
    Indefinite,
}

impl AdmissionTimeout {
    /// Map a signed millisecond timeout: `0` means no wait, a negative value
    /// means wait indefinitely.
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => Self::NoWait,
            m if m < 0 => Self::Indefinite,
            m => Self::Wait(Duration::from_millis(m as u64)),
        }
    }
}

/// Semaphore-backed admission gate with an unlimited mode.
///
/// ## Purpose
/// Bounds how many messages may occupy a structure: each admitted message
/// consumes one permit, each removal returns one. An unbounded gate admits
/// everything and ignores releases.
///
/// ## Invariants
/// - A waiting [`CapacityGate::try_acquire`] that is cancelled consumes
///   nothing; the Tokio semaphore returns the permit of a dropped wait
/// - Releases may push availability past the configured capacity; callers
///   own the correctness of the count
#[derive(Debug)]
pub struct CapacityGate {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Unbounded,
    Bounded {
        semaphore: Semaphore,
        capacity: NonZeroUsize,
    },
}

impl CapacityGate {
    /// Create a gate admitting up to `capacity` holders.
    pub fn new(capacity: Capacity) -> Self {
        let inner = match capacity {
            Capacity::Unbounded => Inner::Unbounded,
            Capacity::Bounded(capacity) => Inner::Bounded {
                semaphore: Semaphore::new(capacity.get()),
                capacity,
            },
        };
        Self { inner }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> Capacity {
        match &self.inner {
            Inner::Unbounded => Capacity::Unbounded,
            Inner::Bounded { capacity, .. } => Capacity::Bounded(*capacity),
        }
    }

    /// Attempt to take one permit, waiting according to `timeout`.
    ///
    /// Returns `true` once a permit was consumed, `false` when the wait was
    /// exhausted. Always `true` for an unbounded gate.
    pub async fn try_acquire(&self, timeout: AdmissionTimeout) -> bool {
        let semaphore = match &self.inner {
            Inner::Unbounded => return true,
            Inner::Bounded { semaphore, .. } => semaphore,
        };
        match timeout {
            AdmissionTimeout::NoWait => match semaphore.try_acquire() {
                Ok(permit) => {
                    permit.forget();
                    true
                }
                Err(_) => false,
            },
            AdmissionTimeout::Wait(limit) => {
                match tokio::time::timeout(limit, semaphore.acquire()).await {
                    Ok(Ok(permit)) => {
                        permit.forget();
                        true
                    }
                    Ok(Err(_)) | Err(_) => false,
                }
            }
            AdmissionTimeout::Indefinite => match semaphore.acquire().await {
                Ok(permit) => {
                    permit.forget();
                    true
                }
                Err(_) => false,
            },
        }
    }

    /// Take one permit unconditionally, without blocking.
    ///
    /// Used only at group bootstrap to account for the first incoming
    /// message; the caller owns count correctness from then on. Availability
    /// saturates at zero.
    pub fn force_acquire(&self) {
        if let Inner::Bounded { semaphore, .. } = &self.inner {
            semaphore.forget_permits(1);
        }
    }

    /// Return one permit.
    pub fn release(&self) {
        self.release_many(1);
    }

    /// Return `permits` permits. Availability may exceed the configured
    /// capacity afterwards.
    pub fn release_many(&self, permits: usize) {
        if let Inner::Bounded { semaphore, .. } = &self.inner {
            semaphore.add_permits(permits);
        }
    }

    /// Currently free permits, or `None` when unbounded.
    pub fn available(&self) -> Option<usize> {
        match &self.inner {
            Inner::Unbounded => None,
            Inner::Bounded { semaphore, .. } => Some(semaphore.available_permits()),
        }
    }
}
