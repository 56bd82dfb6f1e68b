// Criterion benchmarks for swipe-match

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use swipe_match::core::{acceptance_ratio, swipe_ratio, CandidateSelector, RatioCalculator};
use swipe_match::models::{LedgerSnapshot, NewProfile, NewUser, Swipe, SwipeDirection};
use swipe_match::services::{MemoryStore, SwipeStore};

fn create_snapshot(size: i64) -> LedgerSnapshot {
    let direction = |i: i64| {
        if i % 3 == 0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        }
    };

    LedgerSnapshot {
        user_id: 0,
        sent: (1..=size)
            .map(|i| Swipe {
                swiper_id: 0,
                swiped_id: i,
                direction: direction(i),
                created_at: Utc::now(),
            })
            .collect(),
        received: (1..=size)
            .filter(|i| i % 2 == 0)
            .map(|i| Swipe {
                swiper_id: i,
                swiped_id: 0,
                direction: direction(i + 1),
                created_at: Utc::now(),
            })
            .collect(),
    }
}

fn bench_ratios(c: &mut Criterion) {
    let mut group = c.benchmark_group("ratios");

    for size in [10, 100, 1000, 10000].iter() {
        let snapshot = create_snapshot(*size);

        group.bench_with_input(BenchmarkId::new("swipe_ratio", size), &snapshot, |b, snap| {
            b.iter(|| swipe_ratio(black_box(snap)));
        });

        group.bench_with_input(
            BenchmarkId::new("acceptance_ratio", size),
            &snapshot,
            |b, snap| {
                b.iter(|| acceptance_ratio(black_box(snap)));
            },
        );
    }

    group.finish();
}

fn seeded_store(users: usize) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    tokio_test::block_on(async {
        let mut ids = Vec::with_capacity(users);
        for i in 0..users {
            let user = store
                .create_user(NewUser {
                    username: format!("user{}", i),
                    first_name: format!("User {}", i),
                    date_of_birth: None,
                })
                .await
                .unwrap();
            store.create_profile(user.id, NewProfile::default()).await.unwrap();
            ids.push(user.id);
        }

        // Every user swipes on the next few users
        for (i, &id) in ids.iter().enumerate() {
            for offset in 1..=5 {
                let target = ids[(i + offset) % ids.len()];
                let direction = if offset % 2 == 0 {
                    SwipeDirection::Left
                } else {
                    SwipeDirection::Right
                };
                store.insert_swipe(id, target, direction).await.unwrap();
            }
        }
    });
    store
}

fn bench_next_deck(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_deck");
    let runtime = tokio::runtime::Runtime::new().unwrap();

    for size in [50, 500].iter() {
        let store = seeded_store(*size);
        let selector = CandidateSelector::new(store.clone(), RatioCalculator::new(store.clone()));

        group.bench_with_input(BenchmarkId::from_parameter(size), &selector, |b, selector| {
            b.iter(|| runtime.block_on(selector.next_deck(black_box(1))).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ratios, bench_next_deck);
criterion_main!(benches);
