use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{admin, app_state::AppState},
    app_error::AppResult,
    use_cases::waitlist::JoinOutcome,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/waitlist", post(join).get(list_entries))
        .route("/waitlist/{email}", delete(remove_entry))
}

#[derive(Deserialize)]
struct JoinPayload {
    email: String,
    source: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct RosterResponse {
    emails: Vec<String>,
    count: usize,
    storage: &'static str,
}

#[derive(Serialize)]
struct RemoveResponse {
    message: String,
    storage: &'static str,
}

/// POST /waitlist. Public signup endpoint.
async fn join(
    State(app_state): State<AppState>,
    Json(payload): Json<JoinPayload>,
) -> AppResult<impl IntoResponse> {
    let message = match app_state
        .waitlist
        .join(&payload.email, payload.source)
        .await?
    {
        JoinOutcome::Joined => {
            "Successfully joined the waitlist! Check your email for a confirmation."
        }
        JoinOutcome::AlreadyJoined => "You're already on the waitlist!",
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// GET /waitlist. Admin-only roster; unsubscribed entries are included.
async fn list_entries(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    admin::authorize(&headers, &app_state.config.admin_secret)?;

    let roster = app_state.waitlist.roster().await?;
    let emails: Vec<String> = roster.entries.into_iter().map(|e| e.email).collect();
    Ok(Json(RosterResponse {
        count: emails.len(),
        emails,
        storage: roster.storage,
    }))
}

/// DELETE /waitlist/{email}. Admin-only hard delete, irreversible.
async fn remove_entry(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> AppResult<impl IntoResponse> {
    admin::authorize(&headers, &app_state.config.admin_secret)?;

    let removal = app_state.waitlist.remove(&email).await?;
    let message = if removal.removed {
        format!("{email} removed from the waitlist")
    } else {
        format!("{email} was not on the waitlist")
    };
    Ok(Json(RemoveResponse {
        message,
        storage: removal.storage,
    }))
}
