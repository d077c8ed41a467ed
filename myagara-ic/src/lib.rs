//! myagara-ic library interface
//!
//! Exposes the router and services so integration tests can drive them
//! without a running binary.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::UploadOrchestrator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub images: Arc<UploadOrchestrator>,
    /// Request body cap for `POST /api/images/upload`
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(images: Arc<UploadOrchestrator>, max_upload_bytes: usize) -> Self {
        Self {
            images,
            max_upload_bytes,
            startup_time: myagara_common::time::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::image_routes(state.max_upload_bytes))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
