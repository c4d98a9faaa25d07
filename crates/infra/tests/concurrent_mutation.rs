//! Concurrent mutation tests for `LedgerService`.
//!
//! Many threads record expenses and settlements against the same group at
//! once. Per-group locking must serialise them so no update is lost and the
//! balances still sum to zero.
//!
//! Run with: cargo test -p splitledger-infra --test concurrent_mutation

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use splitledger_core::GroupId;
use splitledger_events::NoOpPublisher;
use splitledger_infra::{InMemoryGroupRepository, LedgerService};

/// Number of concurrent threads.
const THREAD_COUNT: usize = 8;

/// Operations per thread.
const ITERATIONS_PER_THREAD: usize = 25;

type Service = LedgerService<InMemoryGroupRepository, NoOpPublisher>;

fn group_with_members(service: &Service, name: &str, count: usize) -> GroupId {
    let group_id = service.create_group(name, "owner@example.com").unwrap();
    for i in 1..count {
        service
            .add_participant(group_id, &format!("member{i}@example.com"))
            .unwrap();
    }
    group_id
}

fn sum_of_balances(service: &Service, group_id: GroupId) -> Decimal {
    service
        .get_balances(group_id)
        .unwrap()
        .iter()
        .map(|b| b.balance.amount())
        .sum()
}

#[test]
fn concurrent_expenses_on_one_group_are_not_lost() {
    let service = Arc::new(LedgerService::new(InMemoryGroupRepository::new(), NoOpPublisher));
    let group_id = group_with_members(&service, "Shared", 3);
    let payers: Vec<_> = service
        .get_balances(group_id)
        .unwrap()
        .iter()
        .map(|b| b.participant_id)
        .collect();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let success_count = Arc::clone(&success_count);
            let payer = payers[thread_id % payers.len()];

            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    let description = format!("t{thread_id} i{i}");
                    service
                        .record_activity(group_id, &description, dec!(10.00), payer, None)
                        .unwrap();
                    success_count.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = THREAD_COUNT * ITERATIONS_PER_THREAD;
    assert_eq!(success_count.load(Ordering::SeqCst), expected);

    let history = service.expense_history(group_id, 0, Some(500)).unwrap();
    assert_eq!(history.total_elements, expected);
    assert_eq!(sum_of_balances(&service, group_id), Decimal::ZERO);
}

#[test]
fn mixed_operations_keep_the_zero_sum() {
    let service = Arc::new(LedgerService::new(InMemoryGroupRepository::new(), NoOpPublisher));
    let group_id = group_with_members(&service, "Mixed", 4);
    let ids: Vec<_> = service
        .get_balances(group_id)
        .unwrap()
        .iter()
        .map(|b| b.participant_id)
        .collect();
    let ids = Arc::new(ids);
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let ids = Arc::clone(&ids);

            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    let a = ids[(thread_id + i) % ids.len()];
                    let b = ids[(thread_id + i + 1) % ids.len()];
                    if i % 3 == 0 {
                        service.settle(group_id, a, b, dec!(3.33)).unwrap();
                    } else {
                        service
                            .record_activity(group_id, "Round", dec!(10.01), a, Some(vec![b]))
                            .unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sum_of_balances(&service, group_id), Decimal::ZERO);
}

#[test]
fn different_groups_progress_independently() {
    let service = Arc::new(LedgerService::new(InMemoryGroupRepository::new(), NoOpPublisher));
    let groups: Vec<GroupId> = (0..THREAD_COUNT)
        .map(|i| group_with_members(&service, &format!("Group {i}"), 2))
        .collect();
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = groups
        .iter()
        .copied()
        .map(|group_id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let payer = service.get_balances(group_id).unwrap()[0].participant_id;
                for _ in 0..ITERATIONS_PER_THREAD {
                    service
                        .record_activity(group_id, "Bill", dec!(2.00), payer, None)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for group_id in groups {
        let balances = service.get_balances(group_id).unwrap();
        assert_eq!(balances[0].balance.amount(), dec!(25.00));
        assert_eq!(balances[1].balance.amount(), dec!(-25.00));
    }
}
