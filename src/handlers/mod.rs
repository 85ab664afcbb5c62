//! HTTP request handlers

pub mod health;
pub mod run;

use crate::storage::Storage;

/// Application state shared across handlers
pub struct AppState {
    pub storage: Storage,
}
