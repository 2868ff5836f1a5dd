//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index for picking the
//! vertex under a pointer and for nearest-neighbor and range queries.

mod rtree;

pub use rtree::SpatialIndex;
