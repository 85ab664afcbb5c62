//! Runtime configuration
//!
//! Output locations are resolved once at process start and passed into the
//! pipeline explicitly; nothing reads the environment after startup.

use std::path::PathBuf;

/// Default output directory for snapshots and run history
pub const DEFAULT_OUTPUTS_DIR: &str = "outputs";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub outputs_dir: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from the environment with sensible defaults
    /// (`HOST`, `PORT`, `OUTPUTS_DIR`).
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            outputs_dir: std::env::var("OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUTS_DIR)),
        }
    }
}
