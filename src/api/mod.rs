pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::IntentModel;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<IntentModel>,
}

impl AppState {
    pub fn new(model: IntentModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}
