use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use life_engine::{Cell, PendingInputBuffer};

fn set(list: &[(i32, i32)]) -> HashSet<Cell> {
    list.iter().copied().map(Cell::from).collect()
}

#[test]
fn flushed_batch_is_delivered_exactly_once() {
    let input = PendingInputBuffer::new();
    input.add_pending(1.0, 1.0, 0.4);
    input.add_pending(2.0, 1.0, 0.6);
    input.add_pending(3.0, 1.0, 0.8);
    input.flush();

    assert_eq!(input.take_processed(), set(&[(1, 1), (2, 1), (3, 1)]));
    assert!(input.take_processed().is_empty());
}

#[test]
fn nothing_is_processed_before_flush() {
    let input = PendingInputBuffer::new();
    input.add_pending(7.0, 8.0, 1.0);

    assert!(input.take_processed().is_empty());
    assert_eq!(input.peek_unprocessed(), vec![Cell::new(7, 8)]);
}

#[test]
fn peeking_does_not_consume() {
    let input = PendingInputBuffer::new();
    input.add_pending(0.2, 0.3, 1.0);
    input.add_pending(5.0, 5.0, 1.0);

    let first: HashSet<Cell> = input.peek_unprocessed().into_iter().collect();
    let second: HashSet<Cell> = input.peek_unprocessed().into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first, set(&[(0, 0), (5, 5)]));
}

#[test]
fn later_flush_replaces_an_untaken_batch() {
    let input = PendingInputBuffer::new();
    input.add_pending(1.0, 1.0, 1.0);
    input.flush();
    input.add_pending(9.0, 9.0, 1.0);
    input.flush();

    assert_eq!(input.take_processed(), set(&[(9, 9)]));
    assert!(input.take_processed().is_empty());
}

#[test]
fn concurrent_takes_see_whole_batches() {
    let input = Arc::new(PendingInputBuffer::new());
    let producer_input = Arc::clone(&input);

    let producer = thread::spawn(move || {
        for i in 0..500 {
            producer_input.add_pending(i as f32, 0.0, 1.0);
            if i % 10 == 9 {
                producer_input.flush();
            }
        }
    });

    let mut batches = Vec::new();
    while !producer.is_finished() {
        let batch = input.take_processed();
        if !batch.is_empty() {
            batches.push(batch);
        }
    }
    producer.join().unwrap();
    batches.push(input.take_processed());

    // Each flush promotes exactly ten consecutive cells; a take never sees
    // part of one.
    for batch in batches.iter().filter(|b| !b.is_empty()) {
        let first = batch.iter().map(|c| c.x).min().unwrap();
        assert_eq!(first % 10, 0);
        let expected: HashSet<Cell> = (first..first + 10).map(|x| Cell::new(x, 0)).collect();
        assert_eq!(batch, &expected);
    }
}
