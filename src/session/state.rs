//! Session state owned by the controller.

use std::fmt;

use crate::plot::palette::Theme;
use crate::plot::types::{Camera, SeriesKind};
use crate::symbolic::Expression;

pub const DEFAULT_EXPRESSION: &str = "x^2 + y^2";
pub const DEFAULT_POINT: (f64, f64) = (1.0, 1.0);

/// The point (x0, y0) at which derivatives and the tangent plane are taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationPoint {
    x: f64,
    y: f64,
}

impl EvaluationPoint {
    /// `None` unless both coordinates are finite.
    pub fn new(x: f64, y: f64) -> Option<Self> {
        (x.is_finite() && y.is_finite()).then_some(Self { x, y })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

impl Default for EvaluationPoint {
    fn default() -> Self {
        Self {
            x: DEFAULT_POINT.0,
            y: DEFAULT_POINT.1,
        }
    }
}

impl fmt::Display for EvaluationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A user-facing visibility switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Surface,
    TangentPlane,
    Gradient,
    Contour,
    Vectors,
}

impl Toggle {
    pub const ALL: [Toggle; 5] = [
        Toggle::Surface,
        Toggle::TangentPlane,
        Toggle::Gradient,
        Toggle::Contour,
        Toggle::Vectors,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Toggle::Surface => "Surface",
            Toggle::TangentPlane => "Tangent plane",
            Toggle::Gradient => "Gradient",
            Toggle::Contour => "Contour",
            Toggle::Vectors => "Vector field",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub surface: bool,
    pub tangent_plane: bool,
    pub gradient: bool,
    pub contour: bool,
    pub vectors: bool,
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self {
            surface: true,
            tangent_plane: true,
            gradient: true,
            contour: true,
            vectors: true,
        }
    }
}

impl VisibilityState {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Surface => self.surface,
            Toggle::TangentPlane => self.tangent_plane,
            Toggle::Gradient => self.gradient,
            Toggle::Contour => self.contour,
            Toggle::Vectors => self.vectors,
        }
    }

    fn slot(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::Surface => &mut self.surface,
            Toggle::TangentPlane => &mut self.tangent_plane,
            Toggle::Gradient => &mut self.gradient,
            Toggle::Contour => &mut self.contour,
            Toggle::Vectors => &mut self.vectors,
        }
    }

    pub fn flip(&mut self, toggle: Toggle) -> bool {
        let slot = self.slot(toggle);
        *slot = !*slot;
        *slot
    }

    /// Whether a series of this kind is drawn. Point markers always are.
    pub fn shows(&self, kind: SeriesKind) -> bool {
        kind.toggle().map_or(true, |t| self.get(t))
    }
}

/// Immutable snapshot of one plot request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub seq: u64,
    pub text: String,
    pub point: EvaluationPoint,
    pub visibility: VisibilityState,
    pub theme: Theme,
    pub camera: Camera,
}

/// What the user currently sees.
#[derive(Debug, Clone)]
pub struct Session {
    /// Last successfully plotted expression.
    pub expression: Expression,
    pub point: EvaluationPoint,
    pub visibility: VisibilityState,
    pub theme: Theme,
    /// Latest committed plot, if any.
    pub view: Option<super::ComputedPlot>,
}

impl Session {
    pub fn new(theme: Theme) -> Self {
        Self {
            expression: default_expression(),
            point: EvaluationPoint::default(),
            visibility: VisibilityState::default(),
            theme,
            view: None,
        }
    }
}

pub(crate) fn default_expression() -> Expression {
    match Expression::parse(DEFAULT_EXPRESSION) {
        Ok(expr) => expr,
        Err(e) => unreachable!("default expression must parse: {}", e),
    }
}
