//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start-work", post(start_work_handler))
        .route("/timer/start-break", post(start_break_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/config", put(config_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/export", get(stats_export_handler))
        .route("/break-tasks", get(list_break_tasks_handler).post(add_break_task_handler))
        .route("/break-tasks/:id", delete(delete_break_task_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
