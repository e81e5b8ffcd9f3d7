//! HTTP API for tasks and goals.
//!
//! Two resources with a one-to-many link (a goal owns tasks), served by
//! stateless axum handlers over a SQLite store.

use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

use crate::db::Store;

/// Shared handler state; cloning shares the underlying pool.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

/// Builds the full router over the given store.
pub fn app(store: Store) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route(
            "/tasks/:id/mark_complete",
            patch(handlers::mark_task_complete),
        )
        .route(
            "/tasks/:id/mark_incomplete",
            patch(handlers::mark_task_incomplete),
        )
        .route(
            "/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/goals/:id",
            get(handlers::get_goal)
                .put(handlers::update_goal)
                .delete(handlers::delete_goal),
        )
        .route(
            "/goals/:id/tasks",
            get(handlers::list_goal_tasks).post(handlers::assign_goal_tasks),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
