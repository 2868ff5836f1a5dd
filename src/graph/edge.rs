//! Edge type.
//!
//! An edge is a stored-ordered pair of vertex indices. The force model
//! treats it symmetrically, but the order decides which endpoint the
//! attraction vector is computed from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::vertex::VertexId;

/// A connection between two vertices, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint.
    pub v: u32,
    /// Second endpoint.
    pub w: u32,
}

impl Edge {
    /// Create a new edge.
    #[inline]
    pub fn new(v: u32, w: u32) -> Self {
        Self { v, w }
    }

    /// First endpoint as a VertexId.
    #[inline]
    pub fn source(self) -> VertexId {
        VertexId(self.v)
    }

    /// Second endpoint as a VertexId.
    #[inline]
    pub fn target(self) -> VertexId {
        VertexId(self.w)
    }

    /// Both endpoints are the same vertex.
    #[inline]
    pub fn is_self_loop(self) -> bool {
        self.v == self.w
    }

    /// Parse a flat `[v0, w0, v1, w1, ...]` buffer.
    ///
    /// A trailing unpaired element is ignored; callers that care check the
    /// length first.
    pub fn from_pairs(pairs: &[u32]) -> Vec<Self> {
        pairs
            .chunks_exact(2)
            .map(|pair| Self::new(pair[0], pair[1]))
            .collect()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({}-{})", self.v, self.w)
    }
}

impl From<(u32, u32)> for Edge {
    #[inline]
    fn from((v, w): (u32, u32)) -> Self {
        Self { v, w }
    }
}
