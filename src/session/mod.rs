pub mod controller;
pub mod debounce;
pub mod derived;
pub mod error;
pub mod presets;
pub mod state;

pub use controller::{ComputedPlot, Controller, PlotOutcome};
pub use debounce::Debouncer;
pub use error::VizError;
pub use state::{EvaluationPoint, Toggle, VisibilityState};
