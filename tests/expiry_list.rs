use vigilis::timer::ExpiryList;

use std::time::{Duration, Instant};

fn assert_sorted(list: &ExpiryList) {
    let entries = list.entries();

    for pair in entries.windows(2) {
        assert!(
            pair[0].1 <= pair[1].1,
            "expiry list out of order: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn add_keeps_ascending_order() {
    let mut list = ExpiryList::new();
    let base = Instant::now();

    // Insert deliberately out of order.
    for secs in [5usize, 1, 9, 3, 7, 2, 8] {
        list.add(secs, base + Duration::from_secs(secs as u64));
        assert_sorted(&list);
    }

    assert_eq!(list.len(), 7);

    let tokens: Vec<usize> = list.entries().iter().map(|e| e.0).collect();
    assert_eq!(tokens, vec![1, 2, 3, 5, 7, 8, 9]);
}

#[test]
fn equal_deadlines_keep_insertion_order() {
    let mut list = ExpiryList::new();
    let base = Instant::now();
    let deadline = base + Duration::from_secs(1);

    for token in [10, 11, 12] {
        list.add(token, deadline);
    }

    assert_sorted(&list);

    let due = list.tick(deadline);
    assert_eq!(due, vec![10, 11, 12]);
}

#[test]
fn remove_detaches_any_position() {
    let mut list = ExpiryList::new();
    let base = Instant::now();

    let first = list.add(1, base + Duration::from_secs(1));
    let middle = list.add(2, base + Duration::from_secs(2));
    let last = list.add(3, base + Duration::from_secs(3));

    list.remove(middle);
    assert_sorted(&list);
    assert_eq!(list.len(), 2);

    list.remove(first);
    list.remove(last);
    assert!(list.is_empty());

    // Nothing left to expire.
    assert!(list.tick(base + Duration::from_secs(10)).is_empty());
}

#[test]
fn adjust_restores_order() {
    let mut list = ExpiryList::new();
    let base = Instant::now();

    let early = list.add(1, base + Duration::from_secs(1));
    list.add(2, base + Duration::from_secs(2));
    list.add(3, base + Duration::from_secs(3));

    // Fresh activity pushes the earliest deadline past the others.
    let moved = list.adjust(early, base + Duration::from_secs(10));
    assert_sorted(&list);

    let tokens: Vec<usize> = list.entries().iter().map(|e| e.0).collect();
    assert_eq!(tokens, vec![2, 3, 1]);

    // The adjusted timer is still removable through its new handle.
    list.remove(moved);
    assert_eq!(list.len(), 2);
    assert_sorted(&list);
}

#[test]
fn tick_expires_exactly_the_due_prefix() {
    let mut list = ExpiryList::new();
    let base = Instant::now();

    for secs in 1..=5 {
        list.add(secs, base + Duration::from_secs(secs as u64));
    }

    let due = list.tick(base + Duration::from_secs(3));
    assert_eq!(due, vec![1, 2, 3]);
    assert_eq!(list.len(), 2);
    assert_sorted(&list);

    // A deadline exactly at `now` counts as due.
    let due = list.tick(base + Duration::from_secs(4));
    assert_eq!(due, vec![4]);
}

#[test]
fn tick_is_idempotent_for_the_same_instant() {
    let mut list = ExpiryList::new();
    let base = Instant::now();

    for token in 0..4 {
        list.add(token, base + Duration::from_secs(1));
    }

    let now = base + Duration::from_secs(2);

    let first = list.tick(now);
    assert_eq!(first.len(), 4);

    // Skipped sweeps catch up in one call; a repeat finds nothing.
    let second = list.tick(now);
    assert!(second.is_empty());
}

#[test]
fn tick_on_empty_list_is_a_noop() {
    let mut list = ExpiryList::new();

    assert!(list.tick(Instant::now()).is_empty());
    assert!(list.is_empty());
}

#[test]
fn slots_are_reused_after_churn() {
    let mut list = ExpiryList::new();
    let base = Instant::now();

    // Repeatedly fill and drain to force index reuse in the arena.
    for round in 0..10 {
        let ids: Vec<_> = (0..8)
            .map(|i| list.add(i, base + Duration::from_secs(round + i as u64 + 1)))
            .collect();

        assert_sorted(&list);

        for id in ids {
            list.remove(id);
        }

        assert!(list.is_empty());
    }
}
