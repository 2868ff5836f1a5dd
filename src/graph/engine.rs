//! GraphEngine - undirected graph with a position buffer.
//!
//! The GraphEngine stores topology in petgraph's StableGraph and keeps
//! vertex positions in a separate buffer indexed by vertex slot, which is
//! exactly the shape the layout step consumes. Vertices are never removed
//! individually, so slot `i` always holds `VertexId(i)`.


use petgraph::algo::{astar, dijkstra};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use tracing::trace;

use super::edge::Edge;
use super::vertex::{Vec2, VertexId};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::force::distance;
use crate::layout::{DragRelaxation, EdgePassReport, LayoutStepEngine};
use crate::spatial::SpatialIndex;

/// A drag in progress: the relaxation state plus the edge order it was built for.
struct ActiveDrag {
    relaxation: DragRelaxation,
    edges: Vec<Edge>,
}

/// An undirected simple graph that lays itself out.
///
/// This struct manages:
/// - Graph topology via petgraph (no parallel edges, no self-loops)
/// - Vertex positions, one slot per vertex
/// - A lazily rebuilt spatial index for hit testing
/// - The state of an interactive drag
pub struct GraphEngine {
    /// Vertices carry their own id, edges carry nothing.
    graph: StableUnGraph<VertexId, ()>,

    /// Positions by vertex slot.
    positions: Vec<Vec2>,

    /// Spatial index for hit testing
    spatial: SpatialIndex,

    /// Whether the spatial index needs rebuilding
    spatial_dirty: bool,

    drag: Option<ActiveDrag>,
}

impl GraphEngine {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            positions: Vec::new(),
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
            drag: None,
        }
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableUnGraph::with_capacity(vertex_capacity, edge_capacity),
            positions: Vec::with_capacity(vertex_capacity),
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
            drag: None,
        }
    }

    // =========================================================================
    // Vertex Operations
    // =========================================================================

    /// Add a vertex at the specified position.
    ///
    /// NaN or infinite coordinates are rejected.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> LayoutResult<VertexId> {
        let position = Vec2::new(x, y);
        if !position.is_finite() {
            return Err(LayoutError::NonFiniteVertex {
                index: self.positions.len(),
            });
        }

        let id = VertexId(self.positions.len() as u32);
        self.graph.add_node(id);
        self.positions.push(position);
        self.spatial_dirty = true;
        Ok(id)
    }

    /// Add multiple vertices from a positions array [x0, y0, x1, y1, ...].
    ///
    /// Either every vertex is added or, if any coordinate is non-finite,
    /// none is.
    pub fn add_vertices_from_positions(&mut self, positions: &[f64]) -> LayoutResult<u32> {
        let base = self.positions.len();
        if let Some(offset) = positions
            .chunks_exact(2)
            .position(|xy| !Vec2::new(xy[0], xy[1]).is_finite())
        {
            return Err(LayoutError::NonFiniteVertex {
                index: base + offset,
            });
        }

        let count = positions.len() / 2;
        self.positions.reserve(count);
        for xy in positions.chunks_exact(2) {
            self.add_vertex(xy[0], xy[1])?;
        }

        Ok(count as u32)
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Get a vertex's position.
    pub fn position(&self, id: VertexId) -> Option<Vec2> {
        self.positions.get(id.index()).copied()
    }

    /// Set a vertex's position. NaN or infinite coordinates are rejected.
    pub fn set_position(&mut self, id: VertexId, position: Vec2) -> LayoutResult<()> {
        if !position.is_finite() {
            return Err(LayoutError::NonFiniteVertex { index: id.index() });
        }
        let slot = self
            .positions
            .get_mut(id.index())
            .ok_or(LayoutError::UnknownVertex(id))?;
        *slot = position;
        self.spatial_dirty = true;
        Ok(())
    }

    /// All positions, indexed by vertex slot.
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    fn node(&self, id: VertexId) -> Option<NodeIndex> {
        let index = NodeIndex::new(id.index());
        self.graph.contains_node(index).then_some(index)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect two vertices.
    ///
    /// Returns false for unknown vertices, self-loops and edges that already
    /// exist in either direction.
    pub fn add_edge(&mut self, v: VertexId, w: VertexId) -> bool {
        let (Some(a), Some(b)) = (self.node(v), self.node(w)) else {
            return false;
        };
        if a == b || self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// Add edges from pairs [v0, w0, v1, w1, ...].
    ///
    /// Returns the number of edges actually added.
    pub fn add_edges_from_pairs(&mut self, pairs: &[u32]) -> u32 {
        pairs
            .chunks_exact(2)
            .filter(|pair| self.add_edge(VertexId(pair[0]), VertexId(pair[1])))
            .count() as u32
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Get the neighbors of a vertex.
    pub fn neighbors(&self, id: VertexId) -> Vec<VertexId> {
        self.node(id)
            .map(|index| {
                self.graph
                    .neighbors(index)
                    .map(|n| self.graph[n])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every edge once, lower endpoint first, sorted.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (self.graph[e.source()].raw(), self.graph[e.target()].raw());
                Edge::new(a.min(b), a.max(b))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Run one layout step over this graph's positions and edges.
    pub fn step(&mut self, engine: &LayoutStepEngine) -> LayoutResult<EdgePassReport> {
        let edges = self.edges();
        let report = engine.step_in_place(&mut self.positions, &edges)?;
        self.spatial_dirty = true;
        Ok(report)
    }

    /// Start dragging a vertex, freezing the current edge lengths as rest lengths.
    pub fn begin_drag(&mut self, id: VertexId) -> LayoutResult<()> {
        let edges = self.edges();
        let relaxation = DragRelaxation::begin(&self.positions, &edges, id.index())?;
        trace!(vertex = %id, edges = edges.len(), "drag started");
        self.drag = Some(ActiveDrag { relaxation, edges });
        Ok(())
    }

    /// Move the dragged vertex to (x, y) and relax the edges once.
    ///
    /// Returns false when no drag is in progress.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        drag.relaxation
            .relax(&mut self.positions, &drag.edges, Vec2::new(x, y));
        self.spatial_dirty = true;
        true
    }

    /// Release the dragged vertex. Returns false when no drag was in progress.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// The vertex currently being dragged.
    pub fn dragged_vertex(&self) -> Option<VertexId> {
        self.drag
            .as_ref()
            .map(|drag| VertexId(drag.relaxation.held() as u32))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find the vertex under (x, y): the nearest one within `radius`.
    pub fn vertex_at(&mut self, x: f64, y: f64, radius: f64) -> Option<VertexId> {
        self.ensure_spatial_index();
        self.spatial.vertex_at(x, y, radius)
    }

    /// Find all vertices in a rectangle.
    pub fn vertices_in_rect(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Vec<VertexId> {
        self.ensure_spatial_index();
        self.spatial.in_rect(min_x, min_y, max_x, max_y)
    }

    fn ensure_spatial_index(&mut self) {
        if self.spatial_dirty {
            self.spatial.rebuild(&self.positions);
            self.spatial_dirty = false;
        }
    }

    /// Shortest path between two vertices by Euclidean edge length.
    ///
    /// Uses A* with straight-line distance to the goal as the heuristic.
    /// Returns the vertices along the path including both ends, or None if
    /// either vertex is unknown or they are not connected.
    pub fn shortest_path(&self, from: VertexId, to: VertexId) -> Option<Vec<VertexId>> {
        let start = self.node(from)?;
        let goal = self.node(to)?;
        let goal_position = self.positions[to.index()];
        let position = |n: NodeIndex| self.positions[n.index()];

        let (_, path) = astar(
            &self.graph,
            start,
            |n| n == goal,
            |e| distance(position(e.source()), position(e.target())),
            |n| distance(position(n), goal_position),
        )?;

        Some(path.into_iter().map(|n| self.graph[n]).collect())
    }

    /// Shortest path between two vertices by Euclidean edge length, using
    /// Dijkstra's algorithm.
    ///
    /// Same contract as [`shortest_path`](Self::shortest_path). The path is
    /// recovered by walking back from `to` along edges whose length accounts
    /// exactly for the difference in distance from `from`.
    pub fn shortest_path_dijkstra(&self, from: VertexId, to: VertexId) -> Option<Vec<VertexId>> {
        let start = self.node(from)?;
        let goal = self.node(to)?;
        let position = |n: NodeIndex| self.positions[n.index()];
        let edge_length = |a: NodeIndex, b: NodeIndex| distance(position(a), position(b));

        let scores = dijkstra(&self.graph, start, Some(goal), |e| {
            edge_length(e.source(), e.target())
        });
        scores.get(&goal)?;

        let mut path = vec![goal];
        let mut current = goal;
        while current != start {
            let here = current;
            let score = *scores.get(&here)?;
            current = self.graph.neighbors(here).find(|&n| {
                !path.contains(&n)
                    && scores
                        .get(&n)
                        .is_some_and(|&s| s + edge_length(n, here) == score)
            })?;
            path.push(current);
        }

        path.reverse();
        Some(path.into_iter().map(|n| self.graph[n]).collect())
    }

    /// Get the bounding box of all vertices as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.positions.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.positions.iter().fold(init, |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        }))
    }

    /// Clear all vertices and edges, resetting the engine to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.positions.clear();
        self.spatial.clear();
        self.spatial_dirty = false;
        self.drag = None;
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}
