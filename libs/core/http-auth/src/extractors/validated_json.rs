//! JSON extractor with automatic validation using the validator crate.

use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

/// JSON extractor that runs the `validator` crate's `Validate` on the body.
///
/// Rejections mirror the auth error body shape so clients see one format.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| e.into_response())?;

        data.validate().map_err(|e| {
            let details = e
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let messages: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|err| json!({ "code": err.code, "message": err.message }))
                        .collect();
                    (field.to_string(), json!(messages))
                })
                .collect::<serde_json::Map<_, _>>();

            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": {
                        "type": "validation_error",
                        "message": "Request validation failed",
                        "details": details
                    }
                })),
            )
                .into_response()
        })?;

        Ok(ValidatedJson(data))
    }
}
