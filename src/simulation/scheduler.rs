//! Parallel dispatch of the per-frame particle physics phase.
//!
//! The active particle range is split into contiguous, non-overlapping
//! batches, one per worker; each batch is submitted as one task and the
//! caller blocks until every task resolves. Partition disjointness is the
//! sole concurrency-safety argument — batch tasks take no locks.

use std::ops::Range;
use std::sync::Arc;

use crate::core::worker_pool::WorkerPool;
use crate::simulation::forces::{self, Attractor};
use crate::simulation::params::Parameters;
use crate::simulation::states::{MassiveBody, NVec2, Particle};

/// Split `[0, len)` into at most `workers` contiguous ranges of size
/// `ceil(len / workers)`, the final range absorbing the remainder.
/// Every index is covered exactly once.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 || workers == 0 {
        return Vec::new();
    }
    let batch = len.div_ceil(workers);
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    while start < len {
        let end = (start + batch).min(len);
        ranges.push(start..end);
        start = end;
    }
    ranges
}

struct BatchPtr {
    ptr: *mut Particle,
    len: usize,
}

// Safety: each BatchPtr covers a range produced by `partition`, so no two
// tasks ever alias, and `dispatch` blocks until all tasks complete while
// the originating borrow is still held.
unsafe impl Send for BatchPtr {}

/// Update every particle in `particles` against `bodies`, one batch per
/// worker, and return only after all batches have completed. This is the
/// barrier that orders the physics phase before pool compaction.
pub fn dispatch(
    pool: &WorkerPool,
    particles: &mut [Particle],
    bodies: &[MassiveBody],
    center: NVec2,
    dt: f32,
    params: &Parameters,
) {
    if particles.is_empty() {
        return;
    }

    let attractors: Arc<[Attractor]> = bodies.iter().map(Attractor::from).collect();

    let mut handles = Vec::new();
    for range in partition(particles.len(), pool.num_threads()) {
        let batch = BatchPtr {
            // In-bounds: `partition` never yields a start past `len`.
            ptr: unsafe { particles.as_mut_ptr().add(range.start) },
            len: range.len(),
        };
        let attractors = Arc::clone(&attractors);
        let params = params.clone();

        let submitted = pool.submit(move || {
            // Capture the whole BatchPtr, not its raw-pointer field, so
            // its Send impl applies to the closure
            let batch = batch;
            let BatchPtr { ptr, len } = batch;
            // Safety: see BatchPtr — disjoint range, borrow held across
            // the barrier below.
            let batch = unsafe { std::slice::from_raw_parts_mut(ptr, len) };
            forces::update_particle_batch(batch, &attractors, center, dt, &params);
        });

        match submitted {
            Ok(handle) => handles.push(handle),
            // Pool shutting down: no new batches, just drain what went in.
            Err(_) => break,
        }
    }

    for handle in handles {
        handle.wait();
    }
}
