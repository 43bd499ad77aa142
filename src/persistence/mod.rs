pub mod config;

use std::path::PathBuf;

/// Get or create the gradscope data directory (~/.local/share/gradscope/).
pub fn data_dir() -> Option<PathBuf> {
    let dir = dirs::data_dir()?.join("gradscope");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Get or create the gradscope config directory (~/.config/gradscope/).
pub fn config_dir() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("gradscope");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
