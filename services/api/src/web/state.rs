//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use playlist_core::ports::PlaylistStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlaylistStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlaylistStore>, config: Arc<Config>) -> Self {
        Self { store, config }
    }
}
