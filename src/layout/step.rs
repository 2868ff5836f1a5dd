//! One relaxation step: repulsion, then attraction.
//!
//! [`LayoutStepEngine`] owns the active [`LayoutConfig`] and, in threaded
//! mode, the worker pool built for it. A step validates its input, runs the
//! vertex pass to completion, runs the edge pass on the result and only then
//! hands positions back. Reconfiguring needs `&mut self`, so it can never
//! overlap a step in progress.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace, warn};

use super::edge_pass::{EdgePassReport, apply_edge_forces};
use super::force::ForceModel;
use super::vertex_pass::apply_vertex_forces;
use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::graph::{Edge, Vec2};

/// Check a step's input before any force is computed.
///
/// Every position must be finite and every edge endpoint must index into
/// `vertices`.
pub fn validate_input(vertices: &[Vec2], edges: &[Edge]) -> LayoutResult<()> {
    if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
        return Err(LayoutError::NonFiniteVertex { index });
    }
    let vertex_count = vertices.len();
    for (i, edge) in edges.iter().enumerate() {
        for vertex in [edge.v, edge.w] {
            if vertex as usize >= vertex_count {
                return Err(LayoutError::EdgeOutOfRange {
                    edge: i,
                    vertex,
                    vertex_count,
                });
            }
        }
    }
    Ok(())
}

/// Decode a flat `[x0, y0, x1, y1, ...]` buffer, checking it holds `vertex_count` vertices.
pub fn vertices_from_flat(positions: &[f64], vertex_count: usize) -> LayoutResult<Vec<Vec2>> {
    if positions.len() % 2 != 0 {
        return Err(LayoutError::OddBufferLength {
            what: "positions",
            len: positions.len(),
        });
    }
    let actual = positions.len() / 2;
    if actual != vertex_count {
        return Err(LayoutError::VertexCountMismatch {
            declared: vertex_count,
            actual,
        });
    }
    Ok(positions
        .chunks_exact(2)
        .map(|xy| Vec2::new(xy[0], xy[1]))
        .collect())
}

/// Decode a flat `[v0, w0, v1, w1, ...]` buffer, checking it holds `edge_count` edges.
pub fn edges_from_flat(pairs: &[u32], edge_count: usize) -> LayoutResult<Vec<Edge>> {
    if pairs.len() % 2 != 0 {
        return Err(LayoutError::OddBufferLength {
            what: "edges",
            len: pairs.len(),
        });
    }
    let actual = pairs.len() / 2;
    if actual != edge_count {
        return Err(LayoutError::EdgeCountMismatch {
            declared: edge_count,
            actual,
        });
    }
    Ok(Edge::from_pairs(pairs))
}

/// Flatten positions into `[x0, y0, x1, y1, ...]`.
pub fn vertices_to_flat(vertices: &[Vec2]) -> Vec<f64> {
    let mut flat = Vec::with_capacity(vertices.len() * 2);
    for v in vertices {
        flat.push(v.x);
        flat.push(v.y);
    }
    flat
}

fn build_pool(workers: usize) -> LayoutResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("fdag-vertex-{i}"))
        .build()
        .map_err(|e| LayoutError::WorkerPool(e.to_string()))
}

/// Runs layout steps under the most recently installed configuration.
pub struct LayoutStepEngine {
    config: LayoutConfig,
    pool: Option<ThreadPool>,
}

impl LayoutStepEngine {
    /// Create an engine with the default, sequential configuration.
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            pool: None,
        }
    }

    /// Create an engine with `config` installed.
    pub fn with_config(config: LayoutConfig) -> LayoutResult<Self> {
        let mut engine = Self::new();
        engine.configure(config)?;
        Ok(engine)
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Install a new configuration for subsequent steps.
    ///
    /// A NaN constant or an unusable worker count is rejected and the
    /// previous configuration stays active. The worker pool is rebuilt only
    /// when the worker count changes.
    pub fn configure(&mut self, config: LayoutConfig) -> LayoutResult<()> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejected layout config");
            return Err(e);
        }

        let reuse_pool = matches!(
            (&self.pool, config.parallel_workers()),
            (Some(pool), Some(workers)) if pool.current_num_threads() == workers
        );
        if !reuse_pool {
            self.pool = match config.parallel_workers() {
                Some(workers) => Some(build_pool(workers)?),
                None => None,
            };
        }
        self.config = config;

        debug!(
            c1 = config.attraction,
            c2 = config.reference_distance,
            c3 = config.repulsion,
            c4 = config.damping,
            threaded = config.threaded,
            workers = config.workers,
            "layout configured"
        );
        Ok(())
    }

    /// Compute one step and return the new positions.
    ///
    /// The output has the same length and index order as `vertices`.
    pub fn step(&self, vertices: &[Vec2], edges: &[Edge]) -> LayoutResult<Vec<Vec2>> {
        let mut next = vertices.to_vec();
        self.step_in_place(&mut next, edges)?;
        Ok(next)
    }

    /// Compute one step, overwriting `vertices` with the result.
    ///
    /// On a validation error `vertices` is left untouched.
    pub fn step_in_place(
        &self,
        vertices: &mut [Vec2],
        edges: &[Edge],
    ) -> LayoutResult<EdgePassReport> {
        validate_input(vertices, edges)?;
        trace!(
            vertices = vertices.len(),
            edges = edges.len(),
            threaded = self.pool.is_some(),
            "layout step"
        );

        let model = ForceModel::new(&self.config);
        let pool = self.pool.as_ref().map(|pool| (pool, self.config.workers));
        apply_vertex_forces(&model, vertices, pool);
        Ok(apply_edge_forces(&model, vertices, edges))
    }

    /// Compute one step over flat buffers with explicit counts.
    ///
    /// `positions` is `[x0, y0, x1, y1, ...]` holding `vertex_count` vertices;
    /// `edges` is `[v0, w0, v1, w1, ...]` holding `edge_count` edges. Returns
    /// the new positions in the same flat layout.
    pub fn step_flat(
        &self,
        positions: &[f64],
        vertex_count: usize,
        edges: &[u32],
        edge_count: usize,
    ) -> LayoutResult<Vec<f64>> {
        let mut vertices = vertices_from_flat(positions, vertex_count)?;
        let edges = edges_from_flat(edges, edge_count)?;
        self.step_in_place(&mut vertices, &edges)?;
        Ok(vertices_to_flat(&vertices))
    }
}

impl Default for LayoutStepEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample_graph() -> (Vec<Vec2>, Vec<Edge>) {
        let vertices = (0..24)
            .map(|i| {
                let t = i as f64;
                Vec2::new((t * 2.3).cos() * 5.0 + t, (t * 1.1).sin() * 5.0)
            })
            .collect();
        let edges = (0..24u32)
            .map(|i| Edge::new(i, (i * 7 + 3) % 24))
            .chain((0..23u32).map(|i| Edge::new(i, i + 1)))
            .collect();
        (vertices, edges)
    }

    #[test]
    fn test_worked_scenario_repulsion_only() {
        let engine = LayoutStepEngine::new();
        let out = engine
            .step(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)], &[])
            .unwrap();

        assert!(approx(out[0].x, -0.1));
        assert_eq!(out[0].y, 0.0);
        assert!(approx(out[1].x, 1.1));
        assert_eq!(out[1].y, 0.0);
    }

    #[test]
    fn test_worked_scenario_with_edge() {
        let engine = LayoutStepEngine::new();
        let out = engine
            .step(
                &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
                &[Edge::new(0, 1)],
            )
            .unwrap();

        assert!((out[0].x - (-0.084164)).abs() < 1e-6);
        assert!((out[1].x - 1.084164).abs() < 1e-6);
        assert_eq!(out[0].y, 0.0);
        assert_eq!(out[1].y, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let engine = LayoutStepEngine::new();
        let (vertices, edges) = sample_graph();
        let a = engine.step(&vertices, &edges).unwrap();
        let b = engine.step(&vertices, &edges).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_threaded_matches_sequential() {
        let (vertices, edges) = sample_graph();
        let sequential = LayoutStepEngine::new().step(&vertices, &edges).unwrap();

        for workers in [1, 2, 3, 4, 7, 30] {
            let config = LayoutConfig::default().with_workers(workers);
            let engine = LayoutStepEngine::with_config(config).unwrap();
            let threaded = engine.step(&vertices, &edges).unwrap();
            assert_eq!(threaded, sequential, "mismatch with {workers} workers");
        }
    }

    #[test]
    fn test_repulsion_monotonic_in_c3() {
        let vertices = [Vec2::new(0.0, 0.0), Vec2::new(1.5, 0.5)];
        let mut last = 0.0;
        for c3 in [0.5, 1.0, 2.0, 4.0] {
            let config = LayoutConfig::default().with_constants(2.0, 1.0, c3, 0.1);
            let engine = LayoutStepEngine::with_config(config).unwrap();
            let out = engine.step(&vertices, &[]).unwrap();
            let d = (out[1] - out[0]).length();
            assert!(d > last, "distance should grow with C3 (c3={c3})");
            last = d;
        }
    }

    #[test]
    fn test_configure_latest_wins() {
        let mut engine = LayoutStepEngine::new();
        let vertices = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];

        engine
            .configure(LayoutConfig::default().with_constants(2.0, 1.0, 1.0, 0.2))
            .unwrap();
        let out = engine.step(&vertices, &[]).unwrap();
        assert!(approx(out[0].x, -0.2));

        engine.configure(LayoutConfig::default()).unwrap();
        let out = engine.step(&vertices, &[]).unwrap();
        assert!(approx(out[0].x, -0.1));
    }

    #[test]
    fn test_nan_config_keeps_previous() {
        let mut engine = LayoutStepEngine::new();
        let bad = LayoutConfig::default().with_constants(2.0, f64::NAN, 1.0, 0.1);

        let err = engine.configure(bad).unwrap_err();
        assert!(matches!(err, LayoutError::NanConfig { .. }));
        assert_eq!(engine.config(), &LayoutConfig::default());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut engine = LayoutStepEngine::new();
        let err = engine
            .configure(LayoutConfig::default().with_workers(0))
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidWorkerCount));
        assert!(!engine.config().threaded);
    }

    #[test]
    fn test_switch_back_to_sequential() {
        let mut engine = LayoutStepEngine::with_config(LayoutConfig::default().with_workers(2))
            .unwrap();
        assert!(engine.config().threaded);
        engine.configure(LayoutConfig::default()).unwrap();
        assert!(!engine.config().threaded);

        let out = engine
            .step(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)], &[])
            .unwrap();
        assert!(approx(out[1].x, 1.1));
    }

    #[test]
    fn test_edge_out_of_range_rejected_without_side_effects() {
        let engine = LayoutStepEngine::new();
        let mut vertices = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        let err = engine
            .step_in_place(&mut vertices, &[Edge::new(0, 1), Edge::new(1, 2)])
            .unwrap_err();

        assert!(matches!(
            err,
            LayoutError::EdgeOutOfRange {
                edge: 1,
                vertex: 2,
                vertex_count: 2
            }
        ));
        assert_eq!(vertices, vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]);
    }

    #[test]
    fn test_non_finite_vertex_rejected() {
        let engine = LayoutStepEngine::new();
        let err = engine
            .step(&[Vec2::new(0.0, 0.0), Vec2::new(f64::NAN, 1.0)], &[])
            .unwrap_err();
        assert!(matches!(err, LayoutError::NonFiniteVertex { index: 1 }));
    }

    #[test]
    fn test_self_loop_is_harmless() {
        let engine = LayoutStepEngine::new();
        let vertices = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        let with_loop = engine.step(&vertices, &[Edge::new(1, 1)]).unwrap();
        let without = engine.step(&vertices, &[]).unwrap();
        assert_eq!(with_loop, without);
    }

    #[test]
    fn test_empty_graph() {
        let engine = LayoutStepEngine::new();
        assert!(engine.step(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_step_flat() {
        let engine = LayoutStepEngine::new();
        let out = engine.step_flat(&[0.0, 0.0, 1.0, 0.0], 2, &[], 0).unwrap();
        assert_eq!(out.len(), 4);
        assert!(approx(out[0], -0.1));
        assert!(approx(out[2], 1.1));
    }

    #[test]
    fn test_step_flat_count_checks() {
        let engine = LayoutStepEngine::new();

        assert!(matches!(
            engine.step_flat(&[0.0, 0.0, 1.0], 2, &[], 0),
            Err(LayoutError::OddBufferLength { what: "positions", len: 3 })
        ));
        assert!(matches!(
            engine.step_flat(&[0.0, 0.0, 1.0, 0.0], 3, &[], 0),
            Err(LayoutError::VertexCountMismatch { declared: 3, actual: 2 })
        ));
        assert!(matches!(
            engine.step_flat(&[0.0, 0.0, 1.0, 0.0], 2, &[0], 1),
            Err(LayoutError::OddBufferLength { what: "edges", len: 1 })
        ));
        assert!(matches!(
            engine.step_flat(&[0.0, 0.0, 1.0, 0.0], 2, &[0, 1], 2),
            Err(LayoutError::EdgeCountMismatch { declared: 2, actual: 1 })
        ));
    }
}
