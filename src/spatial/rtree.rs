//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Hit testing (nearest vertex within a radius)
//! - Nearest neighbor
//! - Point-in-radius
//! - Rectangle intersection

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::{Vec2, VertexId};

/// A point in the spatial index with associated vertex ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPoint {
    /// The vertex identifier.
    pub id: VertexId,
    /// Position of the vertex.
    pub position: Vec2,
}

impl VertexPoint {
    /// Create a new VertexPoint.
    pub fn new(id: VertexId, position: Vec2) -> Self {
        Self { id, position }
    }
}

impl RTreeObject for VertexPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl PointDistance for VertexPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over vertex positions.
///
/// Uses an R*-tree. The index is a snapshot: it must be rebuilt after
/// positions change.
pub struct SpatialIndex {
    tree: RTree<VertexPoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index from a position buffer, using slot indices as IDs.
    pub fn from_positions(positions: &[Vec2]) -> Self {
        let mut index = Self::new();
        index.rebuild(positions);
        index
    }

    /// Insert a vertex into the index. Non-finite positions are ignored.
    pub fn insert(&mut self, id: VertexId, position: Vec2) {
        if position.is_finite() {
            self.tree.insert(VertexPoint::new(id, position));
        }
    }

    /// Find the vertex under a point: the nearest one no farther than `radius`.
    pub fn vertex_at(&self, x: f64, y: f64, radius: f64) -> Option<VertexId> {
        if !Vec2::new(x, y).is_finite() {
            return None;
        }
        let radius_sq = radius * radius;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= radius_sq)
            .map(|point| point.id)
    }

    /// Find the nearest vertex to a point.
    pub fn nearest(&self, x: f64, y: f64) -> Option<VertexId> {
        self.tree.nearest_neighbor(&[x, y]).map(|point| point.id)
    }

    /// Find all vertices within a rectangle.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<VertexId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    /// Find all vertices within a radius of a point.
    pub fn in_radius(&self, x: f64, y: f64, radius: f64) -> Vec<VertexId> {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance([x, y], radius_sq)
            .map(|point| point.id)
            .collect()
    }

    /// Replace the contents with `positions`, slot `i` becoming `VertexId(i)`.
    ///
    /// Non-finite positions are left out of the index.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        let points: Vec<_> = positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .map(|(i, &p)| VertexPoint::new(VertexId(i as u32), p))
            .collect();

        self.tree = RTree::bulk_load(points);
    }

    /// Clear all vertices from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of vertices in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpatialIndex {
        SpatialIndex::from_positions(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(5.0, 5.0),
        ])
    }

    #[test]
    fn test_nearest() {
        let index = sample();
        assert_eq!(index.nearest(0.0, 0.0), Some(VertexId(0)));
        assert_eq!(index.nearest(6.0, 6.0), Some(VertexId(2)));
        assert_eq!(index.nearest(11.0, 11.0), Some(VertexId(1)));
    }

    #[test]
    fn test_vertex_at() {
        let index = sample();

        // Click right on a vertex.
        assert_eq!(index.vertex_at(0.5, -0.5, 7.0), Some(VertexId(0)));

        // Nothing within reach.
        assert_eq!(index.vertex_at(2.5, 2.5, 1.0), None);

        // Boundary counts as a hit.
        assert_eq!(index.vertex_at(13.0, 14.0, 5.0), Some(VertexId(1)));
    }

    #[test]
    fn test_in_rect() {
        let index = sample();
        let in_rect = index.in_rect(-1.0, -1.0, 6.0, 6.0);
        assert_eq!(in_rect.len(), 2);
        assert!(in_rect.contains(&VertexId(0)));
        assert!(in_rect.contains(&VertexId(2)));
    }

    #[test]
    fn test_in_radius() {
        let mut index = SpatialIndex::new();
        index.insert(VertexId(0), Vec2::new(0.0, 0.0));
        index.insert(VertexId(1), Vec2::new(3.0, 0.0));
        index.insert(VertexId(2), Vec2::new(10.0, 0.0));

        let in_radius = index.in_radius(0.0, 0.0, 5.0);
        assert_eq!(in_radius.len(), 2);
        assert!(in_radius.contains(&VertexId(0)));
        assert!(in_radius.contains(&VertexId(1)));
    }

    #[test]
    fn test_rebuild_skips_non_finite() {
        let mut positions: Vec<Vec2> = (0..81)
            .map(|i| Vec2::new((i % 9) as f64, (i / 9) as f64))
            .collect();
        positions[40] = Vec2::new(f64::NAN, 0.0);
        positions[41] = Vec2::new(5.0, f64::INFINITY);

        let mut index = SpatialIndex::from_positions(&positions);
        assert_eq!(index.len(), 79);
        assert_eq!(index.vertex_at(1.0, 3.0, 0.5), Some(VertexId(28)));
        assert_eq!(index.vertex_at(4.0, 4.0, 0.1), None);
        assert_eq!(index.vertex_at(f64::NAN, 0.0, 1.0), None);

        index.insert(VertexId(81), Vec2::new(f64::NAN, f64::NAN));
        assert_eq!(index.len(), 79);
    }

    #[test]
    fn test_rebuild_and_clear() {
        let mut index = sample();
        index.rebuild(&[Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest(0.0, 0.0), Some(VertexId(0)));

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.nearest(0.0, 0.0), None);
    }
}
