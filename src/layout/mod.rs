//! Force-directed layout step.
//!
//! A step runs two passes over a vertex/edge snapshot:
//!
//! 1. [`vertex_pass`]: every vertex pair repels, computed from the
//!    pre-step positions, optionally split across a worker pool.
//! 2. [`edge_pass`]: every edge attracts its endpoints, accumulated into a
//!    delta buffer and applied once.
//!
//! [`LayoutStepEngine`] sequences the two and owns the configuration.
//! [`drag`] provides the rest-length relaxation used while a vertex is held.

pub mod drag;
pub mod edge_pass;
pub mod force;
pub mod step;
pub mod vertex_pass;

pub use drag::DragRelaxation;
pub use edge_pass::EdgePassReport;
pub use force::ForceModel;
pub use step::LayoutStepEngine;
