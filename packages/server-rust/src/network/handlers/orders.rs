//! Order listing with a status filter.

use axum::extract::State;
use axum::Json;
use petstore_core::{Order, OrderStatus};

use super::AppState;
use crate::network::error::ApiError;
use crate::network::extract::ListQuery;

/// `GET /orders` -- optional exact `status` filter plus `offset`/`limit`.
pub async fn list_orders(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<Vec<Order>>, ApiError> {
    let mut reader = query.reader();
    let status = reader.choice::<OrderStatus>("status");
    let page = reader.page();
    let page = reader.finish(page)?;

    let orders = state
        .repository
        .orders
        .list_where(&|order: &Order| status.is_none_or(|status| order.status == status));
    Ok(Json(page.apply(orders)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Repository;
    use petstore_core::OrderDraft;
    use std::collections::HashMap;

    #[tokio::test]
    async fn status_filter_selects_matching_orders() {
        let state = AppState::new(Repository::in_memory());
        for (pet_id, status) in [
            (1, OrderStatus::Placed),
            (2, OrderStatus::Delivered),
            (3, OrderStatus::Placed),
        ] {
            state.repository.orders.create(OrderDraft {
                pet_id,
                quantity: 1,
                status,
                ..OrderDraft::default()
            });
        }
        let query: ListQuery = HashMap::from([("status".to_string(), "placed".to_string())]).into();
        let Json(orders) = list_orders(State(state), query).await.unwrap();
        let pet_ids: Vec<_> = orders.iter().map(|o| o.pet_id).collect();
        assert_eq!(pet_ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn bad_limit_is_rejected() {
        let state = AppState::new(Repository::in_memory());
        let query: ListQuery = HashMap::from([("limit".to_string(), "0".to_string())]).into();
        let result = list_orders(State(state), query).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
