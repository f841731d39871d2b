use super::*;

#[test]
fn magnitude_of_base_sizes() {
    assert_eq!(magnitude(16, 16).unwrap(), 0);
    assert_eq!(magnitude(32, 16).unwrap(), 1);
    assert_eq!(magnitude(16, 32).unwrap(), 1);
    assert_eq!(magnitude(256, 256).unwrap(), 8);
    assert_eq!(magnitude(4096, 4096).unwrap(), 16);
    // Non power-of-two edges round up to the next doubling.
    assert_eq!(magnitude(17, 16).unwrap(), 1);
}

#[test]
fn magnitude_is_monotonic_under_doubling() {
    let mut w = 16u32;
    while w <= 2048 {
        let mut h = 16u32;
        while h <= 2048 {
            let base = magnitude(w, h).unwrap();
            if let Ok(m) = magnitude(w * 2, h) {
                assert!(m >= base);
            }
            if let Ok(m) = magnitude(w, h * 2) {
                assert!(m >= base);
            }
            h *= 2;
        }
        w *= 2;
    }
}

#[test]
fn magnitude_rejects_out_of_range_edges() {
    assert!(matches!(
        magnitude(15, 16),
        Err(TexError::SizeOutOfRange { width: 15, height: 16 })
    ));
    assert!(magnitude(65537, 16).is_err());
    assert!(magnitude(16, 70000).is_err());
    // Each edge is legal on its own but the area exceeds the largest bucket.
    assert!(magnitude(4096, 8192).is_err());
    assert_eq!(magnitude(65536, 16).unwrap(), 12);
}

#[test]
fn bucket_geometry_follows_formula() {
    assert_eq!(block_bytes(0), 16 * 257);
    assert_eq!(block_bytes(3), 16 * ((256 << 3) + 1));
    assert_eq!(bucket_capacity(0), 256);
    assert_eq!(bucket_capacity(1), 128);
    assert_eq!(bucket_capacity(2), 128);
    assert_eq!(bucket_capacity(3), 64);
    assert_eq!(bucket_capacity(16), 1);
    for m in 0..MAX_MAGNITUDE {
        assert_eq!(block_bytes(m + 1) - 16, 2 * (block_bytes(m) - 16));
    }
}

#[test]
fn allocate_rejects_bad_magnitude() {
    let alloc = BucketAllocator::default();
    assert!(matches!(
        alloc.allocate(17),
        Err(TexError::MagnitudeOutOfRange(17))
    ));
}

#[test]
fn exhaustion_fails_fast_and_release_reopens() {
    let alloc = BucketAllocator::default();
    let block = alloc.allocate(16).unwrap();
    assert_eq!(block.magnitude(), 16);
    assert!(block.texels.capacity() >= payload_texels(16));

    let err = alloc.allocate(16).unwrap_err();
    assert!(matches!(
        err,
        TexError::OutOfCapacity {
            magnitude: 16,
            capacity: 1
        }
    ));

    alloc.deallocate(block);
    let again = alloc.allocate(16).unwrap();
    let st = alloc.stats(16).unwrap();
    assert_eq!(st.live, 1);
    assert_eq!(st.fresh_allocs, 1);
    assert_eq!(st.reused_allocs, 1);
    alloc.deallocate(again);
}

#[test]
fn capacity_scale_widens_buckets() {
    let alloc = BucketAllocator::new(BucketAllocatorOpts { capacity_scale: 3 });
    let blocks: Vec<_> = (0..3).map(|_| alloc.allocate(16).unwrap()).collect();
    assert!(alloc.allocate(16).is_err());
    assert_eq!(alloc.live_blocks(), 3);
    for b in blocks {
        alloc.deallocate(b);
    }
    assert_eq!(alloc.live_blocks(), 0);
}

#[test]
fn concurrent_bursts_balance_out() {
    let alloc = std::sync::Arc::new(BucketAllocator::default());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let alloc = alloc.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let b = alloc.allocate(2).unwrap();
                    alloc.deallocate(b);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let st = alloc.stats(2).unwrap();
    assert_eq!(st.live, 0);
    assert_eq!(st.fresh_allocs + st.reused_allocs, 400);
}
