//! Pairwise force formulas.
//!
//! - **Repulsion** between any two vertices: `C3 / max(d, C2)^2`, floored at
//!   the reference distance so it stays bounded as `d → 0`.
//! - **Attraction** along an edge: `C1 * log10(d / C2)`. It is negative below
//!   `C2` (close endpoints are pushed apart), zero at `C2`, and grows without
//!   bound with distance.
//!
//! Both are multiplied by the damping constant `C4` by the passes that apply
//! them, not here.

use crate::config::LayoutConfig;
use crate::graph::Vec2;

/// Euclidean distance between two positions.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (b - a).length()
}

/// Unit vector pointing from `from` toward `to`.
///
/// Returns the zero vector when the separation is not a normal float
/// (zero, subnormal, NaN or infinite).
#[inline]
pub fn unit_vec(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let magnitude = delta.length();
    if magnitude.is_normal() {
        Vec2::new(delta.x / magnitude, delta.y / magnitude)
    } else {
        Vec2::ZERO
    }
}

/// Force formulas bound to one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceModel {
    attraction: f64,
    reference_distance: f64,
    repulsion: f64,
    damping: f64,
}

impl ForceModel {
    /// Capture the constants of `config`.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            attraction: config.attraction,
            reference_distance: config.reference_distance,
            repulsion: config.repulsion,
            damping: config.damping,
        }
    }

    /// Repulsion magnitude at distance `d`.
    #[inline]
    pub fn repulsion(&self, d: f64) -> f64 {
        let denom = if d > self.reference_distance {
            d
        } else {
            self.reference_distance
        };
        self.repulsion / (denom * denom)
    }

    /// Attraction magnitude at distance `d`. Negative below the reference distance.
    #[inline]
    pub fn attraction(&self, d: f64) -> f64 {
        self.attraction * (d / self.reference_distance).log10()
    }

    /// Global force multiplier (C4).
    #[inline]
    pub fn damping(&self) -> f64 {
        self.damping
    }
}
