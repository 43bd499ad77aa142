//! Derived scalar values shown next to the plots.

use crate::plot::sampler::DerivativeResult;
use crate::session::state::EvaluationPoint;

pub const DEFAULT_PRECISION: usize = 4;
/// Anything past this is below f64 resolution for values near 1.
pub const MAX_PRECISION: usize = 12;

/// Format `value` with `precision` decimals. Anything that would round to
/// zero prints as plain zero, never `-0.0000`. Precision is capped at
/// [`MAX_PRECISION`].
pub fn format_value(value: f64, precision: usize) -> String {
    let precision = precision.min(MAX_PRECISION);
    let half_ulp = 0.5 * 10f64.powi(-(precision as i32));
    let value = if value.abs() < half_ulp { 0.0 } else { value };
    format!("{:.*}", precision, value)
}

/// Display-ready text for the derived values panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedValues {
    pub f0: String,
    pub fx0: String,
    pub fy0: String,
    pub gradient_norm: String,
    pub fx: String,
    pub fy: String,
    pub tangent_plane: String,
}

impl DerivedValues {
    pub fn new(d: &DerivativeResult, point: EvaluationPoint, precision: usize) -> Self {
        let fmt = |v: f64| format_value(v, precision);
        let shifted = |var: &str, at: f64| {
            if at == 0.0 {
                var.to_string()
            } else if at < 0.0 {
                format!("({} + {})", var, fmt(-at))
            } else {
                format!("({} - {})", var, fmt(at))
            }
        };
        let tangent_plane = format!(
            "z = {} + {}*{} + {}*{}",
            fmt(d.f0),
            fmt(d.fx0),
            shifted("x", point.x()),
            fmt(d.fy0),
            shifted("y", point.y()),
        );
        Self {
            f0: fmt(d.f0),
            fx0: fmt(d.fx0),
            fy0: fmt(d.fy0),
            gradient_norm: fmt(d.gradient_norm()),
            fx: d.fx.to_string(),
            fy: d.fy.to_string(),
            tangent_plane,
        }
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 7] {
        [
            ("f(x0, y0)", self.f0.as_str()),
            ("fx(x0, y0)", self.fx0.as_str()),
            ("fy(x0, y0)", self.fy0.as_str()),
            ("|∇f|", self.gradient_norm.as_str()),
            ("fx", self.fx.as_str()),
            ("fy", self.fy.as_str()),
            ("tangent", self.tangent_plane.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Expression;

    #[test]
    fn test_clamps_tiny_values() {
        assert_eq!(format_value(-1e-9, 4), "0.0000");
        assert_eq!(format_value(-0.00004, 4), "0.0000");
        assert_eq!(format_value(-0.00006, 4), "-0.0001");
        assert_eq!(format_value(-0.0, 2), "0.00");
        assert_eq!(format_value(2.0, 4), "2.0000");
    }

    #[test]
    fn test_huge_precision_is_capped() {
        assert_eq!(format_value(1.5, usize::MAX), "1.500000000000");
        assert_eq!(format_value(-1e-20, 1 << 40), "0.000000000000");
    }

    #[test]
    fn test_paraboloid_values() {
        let f = Expression::parse("x^2 + y^2").unwrap();
        let d = DerivativeResult {
            f0: 5.0,
            fx0: 2.0,
            fy0: 4.0,
            fx: f.derivative("x"),
            fy: f.derivative("y"),
        };
        let point = EvaluationPoint::new(1.0, 2.0).unwrap();
        let v = DerivedValues::new(&d, point, DEFAULT_PRECISION);
        assert_eq!(v.f0, "5.0000");
        assert_eq!(v.gradient_norm, "4.4721");
        assert_eq!(v.fx, "2*x");
        assert_eq!(v.tangent_plane, "z = 5.0000 + 2.0000*(x - 1.0000) + 4.0000*(y - 2.0000)");
    }

    #[test]
    fn test_tangent_text_at_origin_and_negative() {
        let f = Expression::parse("x*y").unwrap();
        let d = DerivativeResult {
            f0: 0.0,
            fx0: 0.0,
            fy0: 0.0,
            fx: f.derivative("x"),
            fy: f.derivative("y"),
        };
        let v = DerivedValues::new(&d, EvaluationPoint::new(0.0, -1.5).unwrap(), 2);
        assert_eq!(v.tangent_plane, "z = 0.00 + 0.00*x + 0.00*(y + 1.50)");
    }
}
