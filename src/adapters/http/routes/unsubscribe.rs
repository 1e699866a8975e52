use axum::{
    Json, Router,
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    email_templates,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/unsubscribe", get(confirm_page).post(unsubscribe))
}

#[derive(Deserialize)]
struct ConfirmParams {
    email: Option<String>,
}

#[derive(Deserialize)]
struct UnsubscribePayload {
    email: String,
}

/// GET /unsubscribe?email=... renders a confirmation page whose button posts the
/// email back to this path. The query value is escaped before it reaches
/// the markup.
async fn confirm_page(Query(params): Query<ConfirmParams>) -> Html<String> {
    let email = params.email.unwrap_or_default();
    Html(email_templates::unsubscribe_page(&email))
}

/// POST /unsubscribe flips the unsubscribed flag. Responds with success
/// whether or not the email was ever subscribed, so the endpoint leaks no
/// subscription status.
async fn unsubscribe(
    State(app_state): State<AppState>,
    Json(payload): Json<UnsubscribePayload>,
) -> AppResult<impl IntoResponse> {
    app_state.waitlist.unsubscribe(&payload.email).await;
    Ok(Json(serde_json::json!({
        "message": "You have been unsubscribed."
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;

    use super::*;
    use crate::{
        adapters::http::routes,
        test_utils::{InMemoryBackend, TestAppStateBuilder},
        use_cases::waitlist::WaitlistBackend,
    };

    fn server(app_state: AppState) -> TestServer {
        TestServer::new(routes::router().with_state(app_state)).unwrap()
    }

    #[tokio::test]
    async fn post_marks_entry_unsubscribed_in_both_backends() {
        let primary = Arc::new(InMemoryBackend::new("primary"));
        let fallback = Arc::new(InMemoryBackend::new("fallback"));
        primary.add("a@b.com", None).await.unwrap();
        fallback.add("a@b.com", None).await.unwrap();
        let app_state = TestAppStateBuilder::new()
            .with_primary(primary.clone() as Arc<dyn WaitlistBackend>)
            .with_fallback(fallback.clone() as Arc<dyn WaitlistBackend>)
            .build();
        let server = server(app_state);

        let response = server
            .post("/unsubscribe")
            .json(&serde_json::json!({ "email": "A@B.com" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(primary.entries()[0].unsubscribed);
        assert!(fallback.entries()[0].unsubscribed);
    }

    #[tokio::test]
    async fn post_succeeds_for_unknown_email() {
        let app_state = TestAppStateBuilder::new()
            .with_fallback(Arc::new(InMemoryBackend::new("memory")) as Arc<dyn WaitlistBackend>)
            .build();
        let server = server(app_state);

        let response = server
            .post("/unsubscribe")
            .json(&serde_json::json!({ "email": "never-subscribed@example.com" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body.get("message").unwrap(), "You have been unsubscribed.");
    }

    #[tokio::test]
    async fn get_renders_page_with_escaped_email() {
        let app_state = TestAppStateBuilder::new().build();
        let server = server(app_state);

        let response = server
            .get("/unsubscribe")
            .add_query_param("email", "<script>alert(1)</script>@x.com")
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let page = response.text();
        assert!(!page.contains("<script>alert(1)</script>@x.com"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;@x.com"));
    }

    #[tokio::test]
    async fn get_without_email_still_renders() {
        let app_state = TestAppStateBuilder::new().build();
        let server = server(app_state);

        let response = server.get("/unsubscribe").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
}
