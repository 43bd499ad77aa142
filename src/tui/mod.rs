pub mod app;
pub mod event;
pub mod help;
pub mod input;
pub mod slider;
pub mod status;
pub mod theme;
