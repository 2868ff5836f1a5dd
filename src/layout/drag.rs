//! Interactive drag relaxation.
//!
//! When a vertex is grabbed, every edge's current length is recorded as its
//! rest length. Each drag update moves the grabbed vertex to the pointer and
//! then walks the edges once, moving both endpoints of each edge by half of
//! its length error so the structure follows the pointer like a net of
//! stiff springs.

use crate::error::{LayoutError, LayoutResult};
use crate::graph::{Edge, Vec2, VertexId};

/// Rest lengths captured when a drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DragRelaxation {
    held: usize,
    rest_lengths: Vec<f64>,
}

impl DragRelaxation {
    /// Start dragging vertex `held`, recording the current edge lengths.
    pub fn begin(positions: &[Vec2], edges: &[Edge], held: usize) -> LayoutResult<Self> {
        if held >= positions.len() {
            return Err(LayoutError::UnknownVertex(VertexId(held as u32)));
        }
        let rest_lengths = edges
            .iter()
            .map(|e| match (positions.get(e.v as usize), positions.get(e.w as usize)) {
                (Some(&a), Some(&b)) => (b - a).length(),
                _ => 0.0,
            })
            .collect();
        Ok(Self { held, rest_lengths })
    }

    /// Index of the vertex being dragged.
    pub fn held(&self) -> usize {
        self.held
    }

    /// Rest length recorded for each edge, in edge order.
    pub fn rest_lengths(&self) -> &[f64] {
        &self.rest_lengths
    }

    /// Move the held vertex to `target` and relax every edge once.
    ///
    /// `edges` must be the edge list passed to [`DragRelaxation::begin`].
    /// Edges whose current length is not a normal float are left alone.
    /// Returns the number of edges that were adjusted.
    pub fn relax(&self, positions: &mut [Vec2], edges: &[Edge], target: Vec2) -> usize {
        let Some(held) = positions.get_mut(self.held) else {
            return 0;
        };
        *held = target;

        let mut adjusted = 0;
        for (edge, &rest) in edges.iter().zip(&self.rest_lengths) {
            let (v, w) = (edge.v as usize, edge.w as usize);
            let (Some(&a), Some(&b)) = (positions.get(v), positions.get(w)) else {
                continue;
            };
            let delta = b - a;
            let len = delta.length();
            if !len.is_normal() {
                continue;
            }
            let correction = delta * (0.5 * (len - rest) / len);
            positions[w] -= correction;
            positions[v] += correction;
            adjusted += 1;
        }
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_records_rest_lengths() {
        let positions = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(3.0, 0.0),
        ];
        let edges = [Edge::new(0, 1), Edge::new(1, 2)];
        let drag = DragRelaxation::begin(&positions, &edges, 0).unwrap();

        assert_eq!(drag.held(), 0);
        assert_eq!(drag.rest_lengths(), &[5.0, 4.0]);
    }

    #[test]
    fn test_begin_unknown_vertex() {
        let positions = [Vec2::new(0.0, 0.0)];
        assert!(matches!(
            DragRelaxation::begin(&positions, &[], 3),
            Err(LayoutError::UnknownVertex(VertexId(3)))
        ));
    }

    #[test]
    fn test_single_edge_restores_rest_length() {
        let mut positions = vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)];
        let edges = [Edge::new(0, 1)];
        let drag = DragRelaxation::begin(&positions, &edges, 0).unwrap();

        let adjusted = drag.relax(&mut positions, &edges, Vec2::new(-2.0, 0.0));
        assert_eq!(adjusted, 1);

        // Stretched to 4, both ends move 1 toward each other.
        assert!((positions[0].x - -1.0).abs() < 1e-12);
        assert!((positions[1].x - 1.0).abs() < 1e-12);
        assert!(((positions[1] - positions[0]).length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unconnected_vertices_stay_put() {
        let mut positions = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(10.0, 10.0),
        ];
        let edges = [Edge::new(0, 1)];
        let drag = DragRelaxation::begin(&positions, &edges, 1).unwrap();
        drag.relax(&mut positions, &edges, Vec2::new(1.0, 5.0));

        assert_eq!(positions[2], Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_collapsed_edge_is_skipped() {
        let mut positions = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        let edges = [Edge::new(0, 1)];
        let drag = DragRelaxation::begin(&positions, &edges, 0).unwrap();

        let adjusted = drag.relax(&mut positions, &edges, Vec2::new(1.0, 0.0));
        assert_eq!(adjusted, 0);
        assert_eq!(positions, vec![Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0)]);
    }
}
