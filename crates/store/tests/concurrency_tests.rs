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

//! Concurrency tests:
//! - Same-group adds never exceed capacity and never interleave appends
//! - A group blocked on capacity does not stall other groups
//! - Producer/consumer accounting stays exact under contention

use corral_store::{
    AdmissionTimeout, Capacity, GroupId, MemoryMessageStore, Message, MessageGroupStore,
    StoreConfig,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_never_exceed_group_capacity() {
    const CAPACITY: usize = 16;
    const ATTEMPTS: usize = 64;

    let store = Arc::new(MemoryMessageStore::bounded(
        Capacity::Unbounded,
        Capacity::bounded(CAPACITY),
    ));
    let group_id = GroupId::new("contended");

    let mut handles = Vec::new();
    for i in 0..ATTEMPTS {
        let store = store.clone();
        let group_id = group_id.clone();
        handles.push(tokio::spawn(async move {
            store
                .add_message_to_group(&group_id, Message::new(vec![i as u8]))
                .await
                .is_ok()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, CAPACITY, "exactly capacity-many adds succeed");
    assert_eq!(store.message_group_size(&group_id).await, CAPACITY);

    // Appends never interleaved: every admitted message is present exactly
    // once.
    let ids: Vec<_> = store
        .get_message_group(&group_id)
        .await
        .messages()
        .await
        .iter()
        .map(|m| m.id().clone())
        .collect();
    let unique: HashSet<_> = ids.iter().cloned().collect();
    assert_eq!(unique.len(), ids.len(), "no append was lost or duplicated");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_blocked_group_does_not_stall_other_groups() {
    // g1 is full and its next add waits indefinitely; adds to g2 must still
    // complete promptly, and freeing g1 must unblock the waiter.
    let store = Arc::new(MemoryMessageStore::with_config(
        StoreConfig::default()
            .with_group_capacity(Capacity::bounded(1))
            .with_admission_timeout(AdmissionTimeout::Indefinite),
    ));
    let g1 = GroupId::new("g1");
    let g2 = GroupId::new("g2");

    let first = Message::new(b"g1-first".to_vec());
    store.add_message_to_group(&g1, first.clone()).await.unwrap();

    let blocked_store = store.clone();
    let blocked_group = g1.clone();
    let blocked = tokio::spawn(async move {
        blocked_store
            .add_message_to_group(&blocked_group, Message::new(b"g1-second".to_vec()))
            .await
    });

    // Give the blocked add time to reach its capacity wait.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished(), "g1 add should be waiting for a slot");

    // Liveness: an unrelated group admits immediately.
    let unrelated = tokio::time::timeout(
        Duration::from_millis(500),
        store.add_message_to_group(&g2, Message::new(b"g2".to_vec())),
    )
    .await;
    assert!(
        unrelated.is_ok(),
        "a blocked g1 must not delay operations on g2"
    );

    // The capacity wait holds no lock, so polling g1 proceeds and frees the
    // slot the waiter needs.
    let polled = tokio::time::timeout(
        Duration::from_secs(5),
        store.poll_message_from_group(&g1),
    )
    .await
    .expect("poll must not deadlock against the waiting add")
    .unwrap();
    assert_eq!(polled.map(|m| m.id().clone()), Some(first.id().clone()));

    let added = tokio::time::timeout(Duration::from_secs(5), blocked)
        .await
        .expect("the waiter should finish once a slot frees up")
        .unwrap();
    assert!(added.is_ok());
    assert_eq!(store.message_group_size(&g1).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_producers_and_consumer_keep_accounting_exact() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 32;

    let store = Arc::new(MemoryMessageStore::with_config(
        StoreConfig::default()
            .with_group_capacity(Capacity::bounded(8))
            .with_admission_timeout(AdmissionTimeout::Indefinite),
    ));
    let group_id = GroupId::new("pipeline");

    let mut producers = Vec::new();
    for p in 0..PRODUCERS {
        let store = store.clone();
        let group_id = group_id.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..PER_PRODUCER {
                store
                    .add_message_to_group(&group_id, Message::new(vec![p as u8, i as u8]))
                    .await
                    .expect("indefinite admission only fails on a bug");
            }
        }));
    }

    let consumer_store = store.clone();
    let consumer_group = group_id.clone();
    let consumer = tokio::spawn(async move {
        let mut received = Vec::new();
        while received.len() < PRODUCERS * PER_PRODUCER {
            match consumer_store
                .poll_message_from_group(&consumer_group)
                .await
                .unwrap()
            {
                Some(message) => received.push(message),
                None => tokio::time::sleep(Duration::from_millis(1)).await,
            }
        }
        received
    });

    for producer in producers {
        producer.await.unwrap();
    }
    let received = tokio::time::timeout(Duration::from_secs(30), consumer)
        .await
        .expect("consumer should drain every produced message")
        .unwrap();

    assert_eq!(received.len(), PRODUCERS * PER_PRODUCER);
    let unique: HashSet<_> = received.iter().map(|m| m.id().clone()).collect();
    assert_eq!(unique.len(), received.len(), "no message delivered twice");

    assert_eq!(store.message_group_size(&group_id).await, 0);

    // The gate is back at full capacity: the group admits capacity-many
    // messages without waiting.
    for i in 0..8 {
        tokio::time::timeout(
            Duration::from_millis(500),
            store.add_message_to_group(&group_id, Message::new(vec![0xFF, i])),
        )
        .await
        .expect("a drained group should admit immediately")
        .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_groups_make_progress_in_parallel() {
    const GROUPS: usize = 8;
    const PER_GROUP: usize = 16;

    let store = Arc::new(MemoryMessageStore::bounded(
        Capacity::Unbounded,
        Capacity::bounded(PER_GROUP),
    ));

    let mut handles = Vec::new();
    for g in 0..GROUPS {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let group_id = GroupId::new(format!("g{g}"));
            for i in 0..PER_GROUP {
                store
                    .add_message_to_group(&group_id, Message::new(vec![g as u8, i as u8]))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("independent groups should not block each other")
            .unwrap();
    }

    assert_eq!(store.group_count().await, GROUPS);
    assert_eq!(store.message_count_for_all_groups().await, GROUPS * PER_GROUP);
}
