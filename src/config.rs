//! Layout configuration.
//!
//! [`LayoutConfig`] holds the four force constants and the parallelism
//! settings read by every force computation. The defaults reproduce the
//! constants the layout has always shipped with:
//!
//! | constant | field | default |
//! |---|---|---|
//! | C1 | `attraction` | 2.0 |
//! | C2 | `reference_distance` | 1.0 |
//! | C3 | `repulsion` | 1.0 |
//! | C4 | `damping` | 0.1 |
//!
//! # Example
//!
//! ```
//! use fdag::LayoutConfig;
//!
//! let config = LayoutConfig::default()
//!     .with_constants(5.0, 30.0, 700.0, 7.0)
//!     .with_workers(4);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LayoutError, LayoutResult};

/// Force constants and parallelism settings for one layout step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Attraction scale (C1).
    pub attraction: f64,
    /// Distance floor for repulsion and zero point of attraction (C2).
    pub reference_distance: f64,
    /// Repulsion scale (C3).
    pub repulsion: f64,
    /// Global multiplier applied to every force (C4).
    pub damping: f64,
    /// Run the vertex pass on a worker pool.
    pub threaded: bool,
    /// Number of workers (and partitions) for the threaded vertex pass.
    pub workers: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            attraction: 2.0,
            reference_distance: 1.0,
            repulsion: 1.0,
            damping: 0.1,
            threaded: false,
            workers: 4,
        }
    }
}

impl LayoutConfig {
    /// Build a config from the raw constants, in C1..C4 order.
    pub fn new(c1: f64, c2: f64, c3: f64, c4: f64, threaded: bool, workers: usize) -> Self {
        Self {
            attraction: c1,
            reference_distance: c2,
            repulsion: c3,
            damping: c4,
            threaded,
            workers,
        }
    }

    /// Replace the four force constants.
    #[must_use]
    pub fn with_constants(mut self, c1: f64, c2: f64, c3: f64, c4: f64) -> Self {
        self.attraction = c1;
        self.reference_distance = c2;
        self.repulsion = c3;
        self.damping = c4;
        self
    }

    /// Enable the threaded vertex pass with `workers` partitions.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.threaded = true;
        self.workers = workers;
        self
    }

    /// Run the vertex pass on the calling thread.
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.threaded = false;
        self
    }

    /// Number of workers the vertex pass will use, or `None` when sequential.
    pub fn parallel_workers(&self) -> Option<usize> {
        self.threaded.then_some(self.workers)
    }

    /// Check the config before it is installed.
    ///
    /// A NaN constant is rejected with [`LayoutError::NanConfig`]. Threaded
    /// mode needs at least one worker.
    ///
    /// The constants are meant to be positive, but only NaN is an error. A
    /// `reference_distance` of zero or less is accepted with a warning: it
    /// makes repulsion between coincident vertices infinite, and the step
    /// then produces non-finite positions.
    pub fn validate(&self) -> LayoutResult<()> {
        let constants = [
            self.attraction,
            self.reference_distance,
            self.repulsion,
            self.damping,
        ];
        if constants.iter().any(|c| c.is_nan()) {
            return Err(LayoutError::NanConfig {
                c1: self.attraction,
                c2: self.reference_distance,
                c3: self.repulsion,
                c4: self.damping,
            });
        }
        if self.threaded && self.workers == 0 {
            return Err(LayoutError::InvalidWorkerCount);
        }
        if self.reference_distance <= 0.0 {
            warn!(
                reference_distance = self.reference_distance,
                "non-positive reference distance: coincident vertices will repel infinitely"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.attraction, 2.0);
        assert_eq!(config.reference_distance, 1.0);
        assert_eq!(config.repulsion, 1.0);
        assert_eq!(config.damping, 0.1);
        assert!(!config.threaded);
        assert_eq!(config.workers, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        for i in 0..4 {
            let mut c = [1.0; 4];
            c[i] = f64::NAN;
            let config = LayoutConfig::default().with_constants(c[0], c[1], c[2], c[3]);
            assert!(matches!(
                config.validate(),
                Err(LayoutError::NanConfig { .. })
            ));
        }
    }

    #[test]
    fn test_infinity_is_not_nan() {
        let config = LayoutConfig::default().with_constants(f64::INFINITY, 1.0, 1.0, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_positive_reference_distance_is_accepted() {
        for c2 in [0.0, -1.0] {
            let config = LayoutConfig::default().with_constants(2.0, c2, 1.0, 0.1);
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_zero_workers_only_matters_when_threaded() {
        let config = LayoutConfig::new(2.0, 1.0, 1.0, 0.1, false, 0);
        assert!(config.validate().is_ok());

        let config = config.with_workers(0);
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidWorkerCount)
        ));
    }

    #[test]
    fn test_parallel_workers() {
        let config = LayoutConfig::default();
        assert_eq!(config.parallel_workers(), None);
        assert_eq!(config.with_workers(3).parallel_workers(), Some(3));
        assert_eq!(config.with_workers(3).sequential().parallel_workers(), None);
    }
}
