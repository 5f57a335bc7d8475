//! Application state for the HTTP server.

use std::sync::Arc;

use super::auth::JwtAuth;
use crate::controller::TourController;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<TourController>,
    pub auth: Arc<JwtAuth>,
}

impl AppState {
    pub fn new(controller: TourController, auth: JwtAuth) -> Self {
        Self {
            controller: Arc::new(controller),
            auth: Arc::new(auth),
        }
    }
}
