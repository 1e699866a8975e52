pub mod unsubscribe;
pub mod waitlist;

use axum::{Json, Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(waitlist::router())
        .merge(unsubscribe::router())
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
