use std::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::foundation::error::{TexError, TexResult};

/// Splits index ranges across a persistent worker pool.
///
/// `[0, n)` is cut into `threads` contiguous slices of `n / threads` elements, the last slice
/// absorbing the remainder. All but the last slice are spawned onto the pool; the calling
/// thread runs the last one in place. Calls return only after every slice finished. Slices are
/// unordered, so a partition may only write its own range.
pub struct Dispatcher {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("threads", &self.threads)
            .finish()
    }
}

impl Dispatcher {
    /// Build the worker pool. `None` sizes it from the machine's available parallelism.
    pub fn new(threads: Option<usize>) -> TexResult<Self> {
        let threads = match threads {
            Some(0) => {
                return Err(TexError::validation(
                    "dispatcher 'threads' must be >= 1 when set",
                ));
            }
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };

        // The caller executes one slice itself.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.saturating_sub(1).max(1))
            .thread_name(|i| format!("proctex-worker-{i}"))
            .build()
            .map_err(|e| TexError::worker(format!("failed to build rayon thread pool: {e}")))?;

        tracing::debug!(threads, "dispatcher pool ready");
        Ok(Self { pool, threads })
    }

    /// Number of slices each call is split into.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `f` over every slice of `[0, n)`.
    pub fn run_ranges<F>(&self, n: usize, f: F) -> TexResult<()>
    where
        F: Fn(Range<usize>) -> TexResult<()> + Sync,
    {
        self.run_parts(partition(n, self.threads), f)
    }

    /// Run `f` over disjoint windows of `data`; `f` receives the window's starting index.
    pub fn for_each_span<T, F>(&self, data: &mut [T], f: F) -> TexResult<()>
    where
        T: Send,
        F: Fn(usize, &mut [T]) -> TexResult<()> + Sync,
    {
        self.for_each_chunked(data, 1, f)
    }

    /// Like [`Dispatcher::for_each_span`] but slices on multiples of `unit` elements (e.g. whole
    /// rows). `f` receives the index of the first unit in its window.
    pub fn for_each_chunked<T, F>(&self, data: &mut [T], unit: usize, f: F) -> TexResult<()>
    where
        T: Send,
        F: Fn(usize, &mut [T]) -> TexResult<()> + Sync,
    {
        let unit = unit.max(1);
        let ranges = partition(data.len() / unit, self.threads);
        let mut spans = Vec::with_capacity(ranges.len());
        let mut rest = data;
        for r in ranges {
            let (head, tail) = rest.split_at_mut(r.len() * unit);
            spans.push((r.start, head));
            rest = tail;
        }
        self.run_parts(spans, |(start, span)| f(start, span))
    }

    /// Run `f` over matching windows of two equally long slices.
    pub fn for_each_span_pair<A, B, F>(&self, a: &mut [A], b: &mut [B], f: F) -> TexResult<()>
    where
        A: Send,
        B: Send,
        F: Fn(usize, &mut [A], &mut [B]) -> TexResult<()> + Sync,
    {
        if a.len() != b.len() {
            return Err(TexError::validation(format!(
                "paired spans differ in length ({} vs {})",
                a.len(),
                b.len()
            )));
        }
        let ranges = partition(a.len(), self.threads);
        let mut spans = Vec::with_capacity(ranges.len());
        let (mut rest_a, mut rest_b) = (a, b);
        for r in ranges {
            let (ha, ta) = rest_a.split_at_mut(r.len());
            let (hb, tb) = rest_b.split_at_mut(r.len());
            spans.push((r.start, ha, hb));
            rest_a = ta;
            rest_b = tb;
        }
        self.run_parts(spans, |(start, sa, sb)| f(start, sa, sb))
    }

    fn run_parts<P, F>(&self, mut parts: Vec<P>, f: F) -> TexResult<()>
    where
        P: Send,
        F: Fn(P) -> TexResult<()> + Sync,
    {
        let Some(last) = parts.pop() else {
            return Ok(());
        };
        let mut results: Vec<Option<TexResult<()>>> = (0..=parts.len()).map(|_| None).collect();
        let (spawned, local) = results.split_at_mut(parts.len());

        self.pool.in_place_scope(|s| {
            for (slot, part) in spawned.iter_mut().zip(parts) {
                let f = &f;
                s.spawn(move |_| *slot = Some(guarded(|| f(part))));
            }
            local[0] = Some(guarded(|| f(last)));
        });

        for r in results {
            match r {
                Some(Ok(())) => {}
                Some(Err(e)) => return Err(e),
                None => return Err(TexError::worker("partition finished without a result")),
            }
        }
        Ok(())
    }
}

/// Contiguous slices of `[0, n)`: `parts - 1` of size `n / parts`, the last takes the rest.
pub fn partition(n: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let per = n / parts;
    let mut out = Vec::with_capacity(parts);
    for i in 0..parts - 1 {
        out.push(per * i..per * (i + 1));
    }
    out.push(per * (parts - 1)..n);
    out
}

fn guarded<F>(op: F) -> TexResult<()>
where
    F: FnOnce() -> TexResult<()>,
{
    catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "partition panicked".to_string());
        Err(TexError::worker(msg))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/parallel/dispatch.rs"]
mod tests;
