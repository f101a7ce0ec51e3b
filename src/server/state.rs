//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::Storage;

pub struct AppState {
    pub storage: Storage,
}

pub type SharedState = Arc<Mutex<AppState>>;
