//! Error types for layout steps and graph operations.

use thiserror::Error;

use crate::graph::VertexId;

/// Errors that can occur while configuring or running a layout step.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A force constant is NaN.
    ///
    /// This is unrecoverable for the configuration call that produced it:
    /// the engine keeps its previous configuration.
    #[error("NaN in config: C1: {c1}, C2: {c2}, C3: {c3}, C4: {c4}")]
    NanConfig {
        /// Attraction scale.
        c1: f64,
        /// Reference distance.
        c2: f64,
        /// Repulsion scale.
        c3: f64,
        /// Damping.
        c4: f64,
    },

    /// Threaded mode was requested with no workers.
    #[error("threaded layout requires at least one worker")]
    InvalidWorkerCount,

    /// The worker pool for the parallel vertex pass could not be built.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    /// The declared vertex count disagrees with the supplied vertices.
    #[error("vertex count mismatch: declared {declared}, got {actual}")]
    VertexCountMismatch {
        /// Count passed by the caller.
        declared: usize,
        /// Number of vertices actually supplied.
        actual: usize,
    },

    /// The declared edge count disagrees with the supplied edges.
    #[error("edge count mismatch: declared {declared}, got {actual}")]
    EdgeCountMismatch {
        /// Count passed by the caller.
        declared: usize,
        /// Number of edges actually supplied.
        actual: usize,
    },

    /// A flat pair buffer has an odd number of elements.
    #[error("{what} buffer has odd length {len}")]
    OddBufferLength {
        /// Which buffer ("positions" or "edges").
        what: &'static str,
        /// Its length.
        len: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {index} has a non-finite position")]
    NonFiniteVertex {
        /// Index of the offending vertex.
        index: usize,
    },

    /// An edge references a vertex index outside the vertex sequence.
    #[error("edge {edge} references vertex {vertex}, but there are only {vertex_count} vertices")]
    EdgeOutOfRange {
        /// Index of the offending edge.
        edge: usize,
        /// The out-of-range endpoint.
        vertex: u32,
        /// Number of vertices in the step.
        vertex_count: usize,
    },

    /// A graph operation named a vertex that does not exist.
    #[error("unknown vertex: {0}")]
    UnknownVertex(VertexId),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
