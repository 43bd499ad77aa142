use crate::plot::grid::{DOMAIN_MAX, DOMAIN_MIN};

/// Slider resolution: one tick is 0.1.
pub const TICKS_PER_UNIT: i32 = 10;

/// A coordinate slider over the plotting domain.
///
/// The position is stored as an integer tick count so repeated steps never
/// drift away from the decimal values shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slider {
    pub label: &'static str,
    ticks: i32,
}

impl Slider {
    const MIN: i32 = DOMAIN_MIN as i32 * TICKS_PER_UNIT;
    const MAX: i32 = DOMAIN_MAX as i32 * TICKS_PER_UNIT;

    pub fn new(label: &'static str, value: f64) -> Self {
        let mut slider = Self { label, ticks: 0 };
        slider.set_value(value);
        slider
    }

    pub fn value(&self) -> f64 {
        self.ticks as f64 / TICKS_PER_UNIT as f64
    }

    /// Snap `value` to the nearest tick inside the domain.
    pub fn set_value(&mut self, value: f64) {
        let ticks = (value * TICKS_PER_UNIT as f64).round();
        self.ticks = if ticks.is_finite() {
            (ticks as i32).clamp(Self::MIN, Self::MAX)
        } else {
            0
        };
    }

    /// Move by `delta` ticks. Returns whether the value changed.
    pub fn step(&mut self, delta: i32) -> bool {
        let before = self.ticks;
        self.ticks = (self.ticks + delta).clamp(Self::MIN, Self::MAX);
        self.ticks != before
    }

    pub fn to_min(&mut self) -> bool {
        self.step(Self::MIN - self.ticks)
    }

    pub fn to_max(&mut self) -> bool {
        self.step(Self::MAX - self.ticks)
    }

    /// Position in [0, 1] for drawing.
    pub fn ratio(&self) -> f64 {
        (self.ticks - Self::MIN) as f64 / (Self::MAX - Self::MIN) as f64
    }
}
