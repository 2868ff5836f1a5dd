//! fdag - force-directed graph layout step
//!
//! This crate computes one relaxation step of a 2D force-directed layout:
//! every vertex pair repels, then every edge attracts its endpoints. Callers
//! run the step repeatedly to animate or converge a layout. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen, and is
//! equally usable as a plain Rust library.
//!
//! # Architecture
//!
//! - `config`: Force constants and parallelism settings
//! - `layout`: Force model, vertex and edge passes, the step engine, drag relaxation
//! - `graph`: Vertex/edge types and a petgraph-backed graph that lays itself out
//! - `spatial`: R-tree spatial indexing for hit testing
//! - `error`: Error taxonomy shared by all of the above

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod spatial;

pub use config::LayoutConfig;
pub use error::{LayoutError, LayoutResult};
pub use graph::{Edge, GraphEngine, Vec2, VertexId};
pub use layout::{EdgePassReport, LayoutStepEngine};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for JavaScript.
///
/// Wraps a [`LayoutStepEngine`] for stateless steps over caller-owned
/// buffers, and a [`GraphEngine`] for callers that want the graph kept on
/// the Rust side.
#[wasm_bindgen]
pub struct FdagWasm {
    layout: LayoutStepEngine,
    graph: GraphEngine,
}

#[wasm_bindgen]
impl FdagWasm {
    /// Create an engine with the default configuration and an empty graph.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            layout: LayoutStepEngine::new(),
            graph: GraphEngine::new(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the force constants and parallelism for subsequent steps.
    ///
    /// Throws if any constant is NaN or if threaded mode has no workers; the
    /// previous configuration stays active in that case.
    pub fn configure(
        &mut self,
        c1: f64,
        c2: f64,
        c3: f64,
        c4: f64,
        threaded: bool,
        workers: u32,
    ) -> Result<(), JsError> {
        let config = LayoutConfig::new(c1, c2, c3, c4, threaded, workers as usize);
        self.layout.configure(config)?;
        Ok(())
    }

    /// Set the configuration from a plain object.
    ///
    /// Accepts `{ attraction, referenceDistance, repulsion, damping, threaded,
    /// workers }`; missing fields take their defaults.
    #[wasm_bindgen(js_name = configureFrom)]
    pub fn configure_from(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: LayoutConfig = serde_wasm_bindgen::from_value(config)?;
        self.layout.configure(config)?;
        Ok(())
    }

    /// The active configuration as a plain object.
    pub fn config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.layout.config())?)
    }

    // =========================================================================
    // Stateless Step
    // =========================================================================

    /// Compute one layout step.
    ///
    /// `positions` is [x0, y0, x1, y1, ...] with `vertex_count` vertices and
    /// `edges` is [v0, w0, v1, w1, ...] with `edge_count` edges. Returns the
    /// new positions in the same layout. Throws on malformed input without
    /// computing anything.
    pub fn step(
        &self,
        positions: &[f64],
        vertex_count: u32,
        edges: &[u32],
        edge_count: u32,
    ) -> Result<Float64Array, JsError> {
        let next = self.layout.step_flat(
            positions,
            vertex_count as usize,
            edges,
            edge_count as usize,
        )?;
        Ok(Float64Array::from(&next[..]))
    }

    // =========================================================================
    // Graph Operations
    // =========================================================================

    /// Add a vertex at the specified position. Returns its ID.
    ///
    /// Throws on NaN or infinite coordinates.
    #[wasm_bindgen(js_name = addVertex)]
    pub fn add_vertex(&mut self, x: f64, y: f64) -> Result<u32, JsError> {
        Ok(self.graph.add_vertex(x, y)?.raw())
    }

    /// Add vertices from a Float64Array of positions [x0, y0, x1, y1, ...].
    ///
    /// Returns the number of vertices added. Throws, adding nothing, if any
    /// coordinate is NaN or infinite.
    #[wasm_bindgen(js_name = addVerticesFromPositions)]
    pub fn add_vertices_from_positions(&mut self, positions: &[f64]) -> Result<u32, JsError> {
        Ok(self.graph.add_vertices_from_positions(positions)?)
    }

    /// Connect two vertices. Returns false for duplicates, self-loops and unknown IDs.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, v: u32, w: u32) -> bool {
        self.graph.add_edge(VertexId(v), VertexId(w))
    }

    /// Add edges from a Uint32Array of pairs [v0, w0, v1, w1, ...].
    ///
    /// Returns the number of edges added.
    #[wasm_bindgen(js_name = addEdgesFromPairs)]
    pub fn add_edges_from_pairs(&mut self, pairs: &[u32]) -> u32 {
        self.graph.add_edges_from_pairs(pairs)
    }

    /// Get the number of vertices in the graph.
    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> u32 {
        self.graph.vertex_count()
    }

    /// Get the number of edges in the graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count()
    }

    /// Run one layout step on the stored graph.
    ///
    /// Returns the number of edges skipped as degenerate.
    #[wasm_bindgen(js_name = stepGraph)]
    pub fn step_graph(&mut self) -> Result<u32, JsError> {
        let report = self.graph.step(&self.layout)?;
        Ok(report.skipped as u32)
    }

    /// Positions of the stored graph as [x0, y0, x1, y1, ...].
    pub fn positions(&self) -> Float64Array {
        let flat = layout::step::vertices_to_flat(self.graph.positions());
        Float64Array::from(&flat[..])
    }

    /// Find the vertex under a point, within `radius`.
    #[wasm_bindgen(js_name = findVertexAt)]
    pub fn find_vertex_at(&mut self, x: f64, y: f64, radius: f64) -> Option<u32> {
        self.graph.vertex_at(x, y, radius).map(VertexId::raw)
    }

    /// Start dragging a vertex.
    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, vertex: u32) -> Result<(), JsError> {
        self.graph.begin_drag(VertexId(vertex))?;
        Ok(())
    }

    /// Move the dragged vertex. Returns false when nothing is being dragged.
    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        self.graph.drag_to(x, y)
    }

    /// Release the dragged vertex.
    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) -> bool {
        self.graph.end_drag()
    }

    /// Shortest path between two vertices by edge length.
    ///
    /// Returns the vertex IDs along the path, or an empty array if there is none.
    #[wasm_bindgen(js_name = shortestPath)]
    pub fn shortest_path(&self, from: u32, to: u32) -> Vec<u32> {
        self.graph
            .shortest_path(VertexId(from), VertexId(to))
            .map(|path| path.into_iter().map(VertexId::raw).collect())
            .unwrap_or_default()
    }

    /// Shortest path between two vertices by edge length, using Dijkstra's
    /// algorithm instead of A*.
    #[wasm_bindgen(js_name = shortestPathDijkstra)]
    pub fn shortest_path_dijkstra(&self, from: u32, to: u32) -> Vec<u32> {
        self.graph
            .shortest_path_dijkstra(VertexId(from), VertexId(to))
            .map(|path| path.into_iter().map(VertexId::raw).collect())
            .unwrap_or_default()
    }

    /// Clear all vertices and edges. The configuration is kept.
    pub fn clear(&mut self) {
        self.graph.clear();
    }
}

impl Default for FdagWasm {
    fn default() -> Self {
        Self::new()
    }
}
