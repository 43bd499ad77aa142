pub mod lang;
pub mod persistence;
pub mod plot;
pub mod session;
pub mod symbolic;
pub mod tui;
