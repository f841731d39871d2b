use std::sync::{Mutex, MutexGuard};

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::Texel;

/// Largest valid bucket index.
pub const MAX_MAGNITUDE: u32 = 16;
/// Number of buckets (`0..=MAX_MAGNITUDE`).
pub const BUCKET_COUNT: usize = MAX_MAGNITUDE as usize + 1;
/// Smallest accepted edge length; magnitude 0 covers a `16x16` buffer.
pub const MIN_EDGE: u32 = 16;
/// Largest accepted edge length.
pub const MAX_EDGE: u32 = 65536;

/// Bucket index for a `width x height` buffer.
///
/// Counts the doubling steps from 16 needed to reach each edge and sums both axes.
pub fn magnitude(width: u32, height: u32) -> TexResult<u32> {
    if !(MIN_EDGE..=MAX_EDGE).contains(&width) || !(MIN_EDGE..=MAX_EDGE).contains(&height) {
        return Err(TexError::SizeOutOfRange { width, height });
    }
    let m = doubling_steps(width) + doubling_steps(height);
    if m > MAX_MAGNITUDE {
        return Err(TexError::SizeOutOfRange { width, height });
    }
    Ok(m)
}

fn doubling_steps(edge: u32) -> u32 {
    let mut steps = 0;
    let mut reach = MIN_EDGE;
    while reach < edge {
        reach <<= 1;
        steps += 1;
    }
    steps
}

/// Payload texels held by one block of bucket `m`.
pub fn payload_texels(m: u32) -> usize {
    256usize << m
}

/// Bytes per block of bucket `m`: one header texel plus the payload.
pub fn block_bytes(m: u32) -> usize {
    (payload_texels(m) + 1) * std::mem::size_of::<Texel>()
}

/// Live-block capacity of bucket `m`; halves every two magnitudes.
pub fn bucket_capacity(m: u32) -> usize {
    256usize >> m.div_ceil(2)
}

/// Allocator configuration.
#[derive(Debug, Clone, Copy)]
pub struct BucketAllocatorOpts {
    /// Multiplier applied to every bucket's capacity.
    pub capacity_scale: usize,
}

impl Default for BucketAllocatorOpts {
    fn default() -> Self {
        Self { capacity_scale: 1 }
    }
}

/// Counters for one bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BucketStats {
    /// Blocks currently handed out.
    pub live: usize,
    /// Blocks parked for reuse.
    pub retained: usize,
    /// Maximum number of live blocks.
    pub capacity: usize,
    /// Blocks created from fresh memory since startup.
    pub fresh_allocs: u64,
    /// Allocations served from the retained list.
    pub reused_allocs: u64,
}

struct Bucket {
    capacity: usize,
    state: Mutex<BucketState>,
}

#[derive(Default)]
struct BucketState {
    live: usize,
    retained: Vec<Vec<Texel>>,
    fresh_allocs: u64,
    reused_allocs: u64,
}

impl Bucket {
    fn lock(&self) -> MutexGuard<'_, BucketState> {
        // A panic while holding the lock cannot leave the counters half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Storage handed out by [`BucketAllocator::allocate`].
///
/// The block remembers its bucket, so it can only ever be returned to the bucket it came from.
#[derive(Debug)]
pub struct TexelBlock {
    pub(crate) magnitude: u32,
    pub(crate) texels: Vec<Texel>,
}

impl TexelBlock {
    /// Bucket this block belongs to.
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }
}

/// Seventeen fixed-geometry slab buckets for texel storage.
///
/// Bucket metadata lives as long as the allocator; block memory is created on first demand and
/// recycled after release. Each bucket is locked independently, so worker threads may allocate
/// and free concurrently.
pub struct BucketAllocator {
    buckets: Vec<Bucket>,
}

impl std::fmt::Debug for BucketAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketAllocator")
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

impl Default for BucketAllocator {
    fn default() -> Self {
        Self::new(BucketAllocatorOpts::default())
    }
}

impl BucketAllocator {
    /// Build all buckets up front.
    pub fn new(opts: BucketAllocatorOpts) -> Self {
        let scale = opts.capacity_scale.max(1);
        let buckets = (0..=MAX_MAGNITUDE)
            .map(|m| Bucket {
                capacity: bucket_capacity(m).saturating_mul(scale),
                state: Mutex::new(BucketState::default()),
            })
            .collect();
        Self { buckets }
    }

    fn bucket(&self, magnitude: u32) -> TexResult<&Bucket> {
        self.buckets
            .get(magnitude as usize)
            .ok_or(TexError::MagnitudeOutOfRange(magnitude))
    }

    /// Take an empty block from bucket `magnitude`.
    ///
    /// Fails with [`TexError::OutOfCapacity`] when the bucket has no free slot left.
    pub fn allocate(&self, magnitude: u32) -> TexResult<TexelBlock> {
        let bucket = self.bucket(magnitude)?;
        let mut st = bucket.lock();
        if st.live >= bucket.capacity {
            return Err(TexError::OutOfCapacity {
                magnitude,
                capacity: bucket.capacity,
            });
        }
        st.live += 1;
        let texels = match st.retained.pop() {
            Some(v) => {
                st.reused_allocs = st.reused_allocs.saturating_add(1);
                v
            }
            None => {
                st.fresh_allocs = st.fresh_allocs.saturating_add(1);
                Vec::with_capacity(payload_texels(magnitude))
            }
        };
        Ok(TexelBlock { magnitude, texels })
    }

    /// Return a block to the bucket it was allocated from.
    pub fn deallocate(&self, mut block: TexelBlock) {
        let Some(bucket) = self.buckets.get(block.magnitude as usize) else {
            return;
        };
        block.texels.clear();
        let mut st = bucket.lock();
        st.live = st.live.saturating_sub(1);
        if st.retained.len() < bucket.capacity {
            st.retained.push(block.texels);
        }
    }

    /// Snapshot of the counters of bucket `magnitude`.
    pub fn stats(&self, magnitude: u32) -> TexResult<BucketStats> {
        let bucket = self.bucket(magnitude)?;
        let st = bucket.lock();
        Ok(BucketStats {
            live: st.live,
            retained: st.retained.len(),
            capacity: bucket.capacity,
            fresh_allocs: st.fresh_allocs,
            reused_allocs: st.reused_allocs,
        })
    }

    /// Total live blocks across all buckets.
    pub fn live_blocks(&self) -> usize {
        self.buckets.iter().map(|b| b.lock().live).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory/bucket.rs"]
mod tests;
