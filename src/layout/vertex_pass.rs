//! Vertex repulsion pass.
//!
//! Every vertex is pushed away from every other vertex. Each new position
//! is computed only from the positions as they were when the pass began:
//! results go into a separate output buffer that is copied back over the
//! input once every vertex has been processed.
//!
//! # Parallel path
//!
//! The index range `[0, n)` is split into one contiguous partition per
//! worker (`n / workers` each, the last absorbing the remainder). The output
//! buffer is split into matching disjoint `&mut` slices, so workers share the
//! snapshot read-only and never write the same memory. The pass returns only
//! after every worker has finished.
//!
//! Each vertex's inner sum is evaluated by exactly one worker in index order,
//! so the parallel result is bit-identical to the sequential one.

use std::ops::Range;

use rayon::ThreadPool;

use super::force::{ForceModel, distance, unit_vec};
use crate::graph::Vec2;

/// Split `[0, n)` into `workers` contiguous ranges.
///
/// All but the last range have length `n / workers`; the last takes the
/// remainder. When `n < workers` the leading ranges are empty.
///
/// `workers` must be at least one.
pub fn partition(n: usize, workers: usize) -> Vec<Range<usize>> {
    debug_assert!(workers > 0, "partition needs at least one worker");
    let chunk = n / workers;
    (0..workers)
        .map(|i| {
            let begin = i * chunk;
            let end = if i + 1 < workers { begin + chunk } else { n };
            begin..end
        })
        .collect()
}

/// Position of vertex `i` after repulsion from every other vertex in `snapshot`.
#[inline]
fn displaced(model: &ForceModel, snapshot: &[Vec2], i: usize) -> Vec2 {
    let p = snapshot[i];
    let mut moved = p;
    for (j, &q) in snapshot.iter().enumerate() {
        if j == i {
            continue;
        }
        let f = model.repulsion(distance(p, q)) * model.damping();
        moved += unit_vec(q, p) * f;
    }
    moved
}

/// Fill `out` with the displaced positions of vertices `start..start + out.len()`.
fn displace_range(model: &ForceModel, snapshot: &[Vec2], start: usize, out: &mut [Vec2]) {
    for (offset, slot) in out.iter_mut().enumerate() {
        *slot = displaced(model, snapshot, start + offset);
    }
}

/// Compute repulsion-displaced positions on the calling thread.
pub fn repulse_sequential(model: &ForceModel, snapshot: &[Vec2]) -> Vec<Vec2> {
    (0..snapshot.len())
        .map(|i| displaced(model, snapshot, i))
        .collect()
}

/// Compute repulsion-displaced positions on `pool`, one partition per worker.
pub fn repulse_parallel(
    model: &ForceModel,
    snapshot: &[Vec2],
    pool: &ThreadPool,
    workers: usize,
) -> Vec<Vec2> {
    let mut output = vec![Vec2::ZERO; snapshot.len()];

    let mut chunks = Vec::with_capacity(workers);
    let mut rest = output.as_mut_slice();
    for range in partition(snapshot.len(), workers) {
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        chunks.push((range.start, chunk));
        rest = tail;
    }

    pool.scope(|scope| {
        for (start, chunk) in chunks {
            scope.spawn(move |_| displace_range(model, snapshot, start, chunk));
        }
    });

    output
}

/// Apply the repulsion pass to `vertices` in place.
///
/// With `pool` set, the work is split across `workers` partitions on that
/// pool; otherwise it runs sequentially. Either way every update reads the
/// pre-pass positions.
pub fn apply_vertex_forces(
    model: &ForceModel,
    vertices: &mut [Vec2],
    pool: Option<(&ThreadPool, usize)>,
) {
    let updated = match pool {
        Some((pool, workers)) => repulse_parallel(model, vertices, pool, workers),
        None => repulse_sequential(model, vertices),
    };
    vertices.copy_from_slice(&updated);
}
