//! Graph data structures and operations.
//!
//! This module provides the vertex and edge types consumed by the layout
//! step, and [`GraphEngine`], an undirected simple graph built on petgraph's
//! StableGraph that owns a position buffer and drives layout steps,
//! hit testing, drag relaxation and shortest paths over it.

mod edge;
mod engine;
mod vertex;

pub use edge::Edge;
pub use engine::GraphEngine;
pub use vertex::{Vec2, VertexId};
