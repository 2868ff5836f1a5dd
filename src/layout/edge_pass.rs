//! Edge attraction pass.
//!
//! Each edge `(v, w)` contributes `unit(v→w) * attraction(d) * C4` to `v` and
//! the negation to `w`. Contributions are summed into a per-vertex delta
//! buffer and added to the positions once, after every edge has been seen.
//!
//! An edge whose force or displacement is degenerate contributes nothing for
//! this step. That covers coincident endpoints (including self-loops), the
//! reference distance exactly (zero force), and anything non-finite.

use tracing::debug;

use super::force::{ForceModel, distance, unit_vec};
use crate::graph::{Edge, Vec2};

/// Outcome of one edge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgePassReport {
    /// Edges whose displacement was applied.
    pub applied: usize,
    /// Edges skipped as degenerate.
    pub skipped: usize,
}

/// A displacement component is usable when it is finite and not subnormal.
///
/// Exact zero is allowed so that axis-aligned edges still move.
#[inline]
fn usable_component(c: f64) -> bool {
    c == 0.0 || c.is_normal()
}

/// Displacement of `v` caused by one edge, or `None` if the edge is skipped.
#[inline]
fn edge_delta(model: &ForceModel, a: Vec2, b: Vec2) -> Option<Vec2> {
    let f = model.attraction(distance(a, b)) * model.damping();
    if !f.is_normal() {
        return None;
    }
    let delta = unit_vec(a, b) * f;
    if !usable_component(delta.x) || !usable_component(delta.y) || delta == Vec2::ZERO {
        return None;
    }
    Some(delta)
}

/// Apply the attraction of every edge to `vertices` in place.
///
/// Edges naming a vertex outside `vertices` are counted as skipped.
pub fn apply_edge_forces(
    model: &ForceModel,
    vertices: &mut [Vec2],
    edges: &[Edge],
) -> EdgePassReport {
    let mut deltas = vec![Vec2::ZERO; vertices.len()];
    let mut report = EdgePassReport::default();

    for edge in edges {
        let (v, w) = (edge.v as usize, edge.w as usize);
        let delta = match (vertices.get(v), vertices.get(w)) {
            (Some(&a), Some(&b)) => edge_delta(model, a, b),
            _ => None,
        };

        match delta {
            Some(delta) => {
                deltas[v] += delta;
                deltas[w] -= delta;
                report.applied += 1;
            }
            None => report.skipped += 1,
        }
    }

    for (vertex, delta) in vertices.iter_mut().zip(&deltas) {
        *vertex += *delta;
    }

    if report.skipped > 0 {
        debug!(
            applied = report.applied,
            skipped = report.skipped,
            "edge pass skipped degenerate edges"
        );
    }

    report
}
