//! Numeric sampling of f, its partials and the tangent plane over the grids.

use thiserror::Error;

use crate::lang::error::LangError;
use crate::plot::grid::SamplingConfig;
use crate::plot::types::{Point2, Point3};
use crate::session::state::EvaluationPoint;
use crate::symbolic::{Bindings, Expression};

/// A point where an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{expression}' cannot be evaluated at ({x}, {y}): {source}")]
pub struct SamplingError {
    pub expression: String,
    pub x: f64,
    pub y: f64,
    pub source: LangError,
}

/// Evaluate `expr` at `(x, y)`, tagging failures with the location.
pub fn eval_at(expr: &Expression, x: f64, y: f64) -> Result<f64, SamplingError> {
    expr.evaluate(Bindings::new(x, y)).map_err(|source| SamplingError {
        expression: expr.source().to_string(),
        x,
        y,
        source,
    })
}

/// Values of f and its partials at the evaluation point.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeResult {
    pub f0: f64,
    pub fx0: f64,
    pub fy0: f64,
    pub fx: Expression,
    pub fy: Expression,
}

impl DerivativeResult {
    /// Evaluate `f`, `fx`, `fy` at `point`.
    pub fn at(
        f: &Expression,
        fx: &Expression,
        fy: &Expression,
        point: EvaluationPoint,
    ) -> Result<Self, SamplingError> {
        let (x0, y0) = (point.x(), point.y());
        Ok(Self {
            f0: eval_at(f, x0, y0)?,
            fx0: eval_at(fx, x0, y0)?,
            fy0: eval_at(fy, x0, y0)?,
            fx: fx.clone(),
            fy: fy.clone(),
        })
    }

    pub fn gradient_norm(&self) -> f64 {
        (self.fx0 * self.fx0 + self.fy0 * self.fy0).sqrt()
    }
}

/// The plane z = f0 + fx0 (x - x0) + fy0 (y - y0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentPlane {
    pub x0: f64,
    pub y0: f64,
    pub f0: f64,
    pub fx0: f64,
    pub fy0: f64,
}

impl TangentPlane {
    pub fn new(point: EvaluationPoint, d: &DerivativeResult) -> Self {
        Self {
            x0: point.x(),
            y0: point.y(),
            f0: d.f0,
            fx0: d.fx0,
            fy0: d.fy0,
        }
    }

    pub fn at(&self, x: f64, y: f64) -> f64 {
        self.f0 + self.fx0 * (x - self.x0) + self.fy0 * (y - self.y0)
    }

    /// Segment from the touching point along half the gradient.
    pub fn gradient_segment(&self) -> (Point3, Point3) {
        let from = (self.x0, self.y0, self.f0);
        let to = (
            self.x0 + self.fx0 / 2.0,
            self.y0 + self.fy0 / 2.0,
            self.f0 + (self.fx0 + self.fy0) / 2.0,
        );
        (from, to)
    }
}

/// Gradient arrow anchored at a field grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorArrow {
    pub from: Point2,
    pub to: Point2,
}

/// Everything the assembler needs, all finite.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleResult {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// `z[j][i] = f(xs[i], ys[j])`
    pub z: Vec<Vec<f64>>,
    pub tangent: Vec<Vec<f64>>,
    pub plane: TangentPlane,
    pub field_xs: Vec<f64>,
    pub field_ys: Vec<f64>,
    pub arrows: Vec<VectorArrow>,
    pub derivatives: DerivativeResult,
    pub contour_levels: usize,
}

/// Sample `f` and its partials over the configured grids.
///
/// Stops at the first point that fails to evaluate.
pub fn sample(
    f: &Expression,
    fx: &Expression,
    fy: &Expression,
    point: EvaluationPoint,
    config: &SamplingConfig,
) -> Result<SampleResult, SamplingError> {
    let derivatives = DerivativeResult::at(f, fx, fy, point)?;
    let plane = TangentPlane::new(point, &derivatives);

    let xs = config.surface.values();
    let ys = config.surface.values();

    let mut z = Vec::with_capacity(ys.len());
    let mut tangent = Vec::with_capacity(ys.len());
    for &y in &ys {
        let mut z_row = Vec::with_capacity(xs.len());
        let mut t_row = Vec::with_capacity(xs.len());
        for &x in &xs {
            z_row.push(eval_at(f, x, y)?);
            t_row.push(plane.at(x, y));
        }
        z.push(z_row);
        tangent.push(t_row);
    }

    let field_xs = config.field.values();
    let field_ys = config.field.values();
    let mut arrows = Vec::with_capacity(field_xs.len() * field_ys.len());
    for &y in &field_ys {
        for &x in &field_xs {
            let gx = eval_at(fx, x, y)?;
            let gy = eval_at(fy, x, y)?;
            arrows.push(VectorArrow {
                from: (x, y),
                to: (x + config.vector_scale * gx, y + config.vector_scale * gy),
            });
        }
    }

    Ok(SampleResult {
        xs,
        ys,
        z,
        tangent,
        plane,
        field_xs,
        field_ys,
        arrows,
        derivatives,
        contour_levels: config.contour_levels,
    })
}
