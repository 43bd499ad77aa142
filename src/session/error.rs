use thiserror::Error;

use crate::lang::error::LangError;
use crate::plot::render::RenderError;
use crate::plot::sampler::SamplingError;

/// Everything a plot request can fail with.
#[derive(Debug, Error)]
pub enum VizError {
    /// Empty, unparseable or unknown names. Raised before any sampling.
    #[error("invalid expression: {0}")]
    Validation(LangError),
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] SamplingError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("unexpected failure: {0}")]
    Unhandled(String),
}

impl VizError {
    /// Short label for the notice line.
    pub fn category(&self) -> &'static str {
        match self {
            VizError::Validation(_) => "Invalid expression",
            VizError::Evaluation(_) => "Evaluation error",
            VizError::Render(_) => "Render error",
            VizError::Unhandled(_) => "Unexpected error",
        }
    }

    /// Detail without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            VizError::Validation(e) => e.to_string(),
            VizError::Evaluation(e) => e.to_string(),
            VizError::Render(e) => e.to_string(),
            VizError::Unhandled(msg) => msg.clone(),
        }
    }

    /// Describe a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        VizError::Unhandled(msg)
    }
}
