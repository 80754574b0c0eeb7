//! CRUD handlers shared by every resource type.
//!
//! Each handler is generic over [`Stored`] and is instantiated once per
//! resource when the router is built, e.g. `get(get_record::<Pet>)`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::AppState;
use crate::network::error::ApiError;
use crate::network::extract::{ListQuery, RecordId, ValidJson};
use crate::storage::Stored;

/// Confirmation body returned by successful deletes.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub code: u16,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiMessage {
    /// A 200 "success" message.
    #[must_use]
    pub fn success(message: String) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            kind: "success",
            message,
            timestamp: Utc::now(),
        }
    }
}

/// `GET /<resources>` -- every record in creation order, optionally windowed
/// by `offset` and `limit`.
pub async fn list_records<R: Stored>(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<Vec<R>>, ApiError> {
    let mut reader = query.reader();
    let page = reader.page();
    let page = reader.finish(page)?;
    Ok(Json(page.apply(state.repository.store::<R>().list())))
}

/// `GET /<resources>/{id}`
pub async fn get_record<R: Stored>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<R>, ApiError> {
    state
        .repository
        .store::<R>()
        .get(id)
        .map(Json)
        .ok_or_else(ApiError::not_found::<R>)
}

/// `POST /<resources>` -- validates the body, assigns an id, returns 201.
pub async fn create_record<R: Stored>(
    State(state): State<AppState>,
    ValidJson(draft): ValidJson<R::Draft>,
) -> (StatusCode, Json<R>) {
    let record = state.repository.store::<R>().create(draft);
    debug!(resource = R::NAME, id = record.id(), "Record created");
    (StatusCode::CREATED, Json(record))
}

/// `PUT /<resources>/{id}` -- full replacement; `id` and `created_at` are kept.
///
/// The id is checked before the body, so a malformed id is a 422 even when
/// the body is also invalid.
pub async fn update_record<R: Stored>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    ValidJson(draft): ValidJson<R::Draft>,
) -> Result<Json<R>, ApiError> {
    let record = state
        .repository
        .store::<R>()
        .update(id, draft)
        .ok_or_else(ApiError::not_found::<R>)?;
    debug!(resource = R::NAME, id, "Record updated");
    Ok(Json(record))
}

/// `DELETE /<resources>/{id}`
pub async fn delete_record<R: Stored>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<ApiMessage>, ApiError> {
    state
        .repository
        .store::<R>()
        .delete(id)
        .ok_or_else(ApiError::not_found::<R>)?;
    debug!(resource = R::NAME, id, "Record deleted");
    Ok(Json(ApiMessage::success(format!(
        "{} {id} deleted successfully",
        R::NAME
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Repository;
    use petstore_core::{Item, ItemDraft, Pet, PetDraft};

    fn state() -> AppState {
        AppState::new(Repository::in_memory())
    }

    fn pet(name: &str) -> PetDraft {
        PetDraft {
            name: name.to_string(),
            ..PetDraft::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let state = state();
        let (status, Json(first)) =
            create_record::<Pet>(State(state.clone()), ValidJson(pet("Rex"))).await;
        let (_, Json(second)) =
            create_record::<Pet>(State(state.clone()), ValidJson(pet("Fido"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let result = get_record::<Pet>(State(state()), RecordId(42)).await;
        assert!(matches!(
            result,
            Err(ApiError::NotFound { resource: "Pet" })
        ));
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let state = state();
        let created = state.repository.pets.create(pet("Rex"));
        let Json(updated) =
            update_record::<Pet>(State(state.clone()), RecordId(created.id), ValidJson(pet("Max")))
                .await
                .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Max");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let result =
            update_record::<Pet>(State(state()), RecordId(7), ValidJson(pet("Max"))).await;
        assert!(matches!(result, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_reports_success_then_not_found() {
        let state = state();
        let created = state.repository.items.create(ItemDraft {
            name: "Leash".to_string(),
            price: 12.5,
            ..ItemDraft::default()
        });

        let Json(message) = delete_record::<Item>(State(state.clone()), RecordId(created.id))
            .await
            .unwrap();
        assert_eq!(message.code, 200);
        assert_eq!(message.kind, "success");
        assert_eq!(message.message, "Item 1 deleted successfully");

        let again = delete_record::<Item>(State(state), RecordId(created.id)).await;
        assert!(matches!(
            again,
            Err(ApiError::NotFound { resource: "Item" })
        ));
    }

    #[tokio::test]
    async fn list_applies_page_window() {
        let state = state();
        for name in ["a", "b", "c", "d"] {
            state.repository.pets.create(pet(name));
        }
        let query = ListQuery::from(
            [("offset", "1"), ("limit", "2")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<std::collections::HashMap<_, _>>(),
        );
        let Json(pets) = list_records::<Pet>(State(state), query).await.unwrap();
        let names: Vec<_> = pets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }
}
