pub mod assemble;
pub mod cache;
pub mod contour;
pub mod grid;
pub mod palette;
pub mod render;
pub mod sampler;
pub mod types;
