//! Fixed sampling grids over the plotting domain.

/// Evenly spaced axis values. Each value is computed from its index so
/// no rounding error accumulates along the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    pub min: f64,
    pub step: f64,
    pub count: usize,
}

impl SampleGrid {
    /// Grid covering `[min, max]` inclusive.
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let count = ((max - min) / step).round() as usize + 1;
        Self { min, step, count }
    }

    pub fn value(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.count).map(|i| self.value(i)).collect()
    }

    pub fn max(&self) -> f64 {
        self.value(self.count.saturating_sub(1))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub const DOMAIN_MIN: f64 = -5.0;
pub const DOMAIN_MAX: f64 = 5.0;

/// Grids and scale factors used by the sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Axis grid for the surface, tangent plane and contour heights.
    pub surface: SampleGrid,
    /// Axis grid for the gradient vector field.
    pub field: SampleGrid,
    /// Arrow length factor applied to the gradient at each field point.
    pub vector_scale: f64,
    pub contour_levels: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            surface: SampleGrid::new(DOMAIN_MIN, DOMAIN_MAX, 0.25),
            field: SampleGrid::new(DOMAIN_MIN, DOMAIN_MAX, 0.5),
            vector_scale: 0.2,
            contour_levels: 8,
        }
    }
}
