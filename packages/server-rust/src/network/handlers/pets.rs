//! Pet-specific listing and the inventory report.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use petstore_core::{Pet, PetStatus};

use super::AppState;
use crate::network::error::ApiError;
use crate::network::extract::ListQuery;

/// `GET /pets` -- filters by exact `status` and `category`, then windows by
/// `offset`/`limit`. Filters combine with AND.
pub async fn list_pets(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let mut reader = query.reader();
    let status = reader.choice::<PetStatus>("status");
    let category = reader.text("category");
    let page = reader.page();
    let page = reader.finish(page)?;

    let pets = state.repository.pets.list_where(&|pet: &Pet| {
        status.is_none_or(|status| pet.status == status)
            && category
                .as_deref()
                .is_none_or(|category| pet.category.as_deref() == Some(category))
    });
    Ok(Json(page.apply(pets)))
}

/// `GET /inventory` -- number of pets per status, omitting empty statuses.
pub async fn inventory_handler(State(state): State<AppState>) -> Json<BTreeMap<PetStatus, u64>> {
    Json(state.repository.inventory())
}
