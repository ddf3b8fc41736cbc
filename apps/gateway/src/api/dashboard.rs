//! Sample protected pages behind the access gate

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use http_auth::Identity;
use serde_json::json;

async fn overview(identity: Identity) -> impl IntoResponse {
    Json(json!({
        "page": "dashboard",
        "user_id": identity.user_id,
        "username": identity.username,
    }))
}

async fn admin(identity: Identity) -> impl IntoResponse {
    if !identity.has_role("admin") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": { "type": "forbidden", "message": "Admin role required" }
            })),
        )
            .into_response();
    }

    Json(json!({ "page": "admin", "username": identity.username })).into_response()
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(overview))
        .route("/admin", get(admin))
}
