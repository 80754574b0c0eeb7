//! HTTP error taxonomy and its mapping onto status codes.
//!
//! | Variant      | Status | Body                                   |
//! |--------------|--------|----------------------------------------|
//! | `NotFound`   | 404    | `{"detail": "<Resource> not found"}`   |
//! | `Validation` | 422    | `{"detail": [violation, ...]}`         |
//! | `Internal`   | 500    | `{"detail": "Internal Server Error"}`  |
//!
//! Extractor rejections (unreadable or oversized body, undecodable query
//! string) keep axum's status code but carry the message as a JSON `detail`.

use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use petstore_core::{FieldViolation, Loc, Resource, ValidationErrors};
use serde_json::json;
use tracing::error;

/// Body of every 500 response; internal details are logged, never returned.
pub const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error";

/// Errors returned by request handlers and extractors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Body(#[from] BytesRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Not-found error for resource type `R`.
    #[must_use]
    pub fn not_found<R: Resource>() -> Self {
        Self::NotFound { resource: R::NAME }
    }

    /// Validation error for a single field.
    #[must_use]
    pub fn invalid(loc: Vec<Loc>, msg: impl Into<String>, kind: &'static str) -> Self {
        Self::Validation(ValidationErrors::single(FieldViolation::new(loc, msg, kind)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": format!("{resource} not found") })),
            )
                .into_response(),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors.violations() })),
            )
                .into_response(),
            Self::Body(rejection) => {
                (rejection.status(), Json(json!({ "detail": rejection.body_text() })))
                    .into_response()
            }
            Self::Query(rejection) => {
                (rejection.status(), Json(json!({ "detail": rejection.body_text() })))
                    .into_response()
            }
            Self::Internal(err) => {
                error!(error = %err, "Request failed with internal error");
                internal_error_response()
            }
        }
    }
}

/// The generic 500 response shared by handler errors and caught panics.
#[must_use]
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": INTERNAL_ERROR_DETAIL })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore_core::Pet;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_resource_name() {
        let response = ApiError::not_found::<Pet>().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "detail": "Pet not found" }));
    }

    #[tokio::test]
    async fn validation_maps_to_422_with_violation_list() {
        let response = ApiError::invalid(
            vec![Loc::from("body"), Loc::from("name")],
            "Field required",
            "missing",
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({
                "detail": [{ "loc": ["body", "name"], "msg": "Field required", "type": "missing" }]
            })
        );
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response =
            ApiError::Internal(anyhow::anyhow!("store poisoned at 0xdead")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Internal Server Error" })
        );
    }
}
