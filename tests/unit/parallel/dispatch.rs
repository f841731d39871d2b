use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[test]
fn partition_covers_range_with_remainder_in_last_slice() {
    let parts = partition(10, 3);
    assert_eq!(parts, vec![0..3, 3..6, 6..10]);
    let parts = partition(2, 4);
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[3], 0..2);
    assert!(parts[..3].iter().all(|r| r.is_empty()));
}

#[test]
fn zero_threads_is_rejected() {
    assert!(matches!(
        Dispatcher::new(Some(0)),
        Err(TexError::Validation(_))
    ));
}

#[test]
fn every_index_is_visited_once() {
    let d = Dispatcher::new(Some(4)).unwrap();
    let hits: Vec<AtomicUsize> = (0..1001).map(|_| AtomicUsize::new(0)).collect();
    d.run_ranges(hits.len(), |r| {
        for i in r {
            hits[i].fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    })
    .unwrap();
    assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
}

#[test]
fn spans_receive_their_start_index() {
    let d = Dispatcher::new(Some(3)).unwrap();
    let mut data = vec![0usize; 100];
    d.for_each_span(&mut data, |start, span| {
        for (i, v) in span.iter_mut().enumerate() {
            *v = start + i;
        }
        Ok(())
    })
    .unwrap();
    assert!(data.iter().enumerate().all(|(i, v)| i == *v));
}

#[test]
fn chunked_spans_hold_whole_rows() {
    let d = Dispatcher::new(Some(3)).unwrap();
    let mut data = vec![0u32; 16 * 7];
    d.for_each_chunked(&mut data, 16, |row0, span| {
        assert_eq!(span.len() % 16, 0);
        for (r, row) in span.chunks_mut(16).enumerate() {
            row.fill((row0 + r) as u32);
        }
        Ok(())
    })
    .unwrap();
    for (y, row) in data.chunks(16).enumerate() {
        assert!(row.iter().all(|v| *v == y as u32));
    }
}

#[test]
fn first_error_surfaces_after_all_slices_ran() {
    let d = Dispatcher::new(Some(4)).unwrap();
    let ran = AtomicUsize::new(0);
    let err = d
        .run_ranges(40, |r| {
            ran.fetch_add(1, Ordering::SeqCst);
            if r.start == 10 {
                return Err(TexError::validation("slice one"));
            }
            if r.start == 20 {
                return Err(TexError::validation("slice two"));
            }
            Ok(())
        })
        .unwrap_err();
    assert_eq!(ran.load(Ordering::SeqCst), 4);
    assert!(matches!(err, TexError::Validation(m) if m == "slice one"));
}

#[test]
fn panics_become_worker_failures() {
    let d = Dispatcher::new(Some(2)).unwrap();
    let err = d
        .run_ranges(8, |r| {
            if r.start == 0 {
                panic!("boom");
            }
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, TexError::WorkerFailure(m) if m == "boom"));
}

#[test]
fn empty_input_is_a_no_op() {
    let d = Dispatcher::new(Some(2)).unwrap();
    let mut data: Vec<u8> = Vec::new();
    d.for_each_span(&mut data, |_, _| Ok(())).unwrap();
}
