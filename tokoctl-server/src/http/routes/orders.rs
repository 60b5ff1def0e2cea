//! Order endpoints
//!
//! `POST /orders` runs [`place_order`] against [`crate::db::PgStore`]: the
//! stock check, order insert and stock decrement happen in one transaction.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use tokoctl_core::models::Order;
use tokoctl_core::{place_order, PlaceOrder};

use crate::db::repos::OrderRepo;
use crate::db::{Paginated, Pagination, PaginationParams};
use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::http::server::AppState;

/// POST /orders - place an order
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = place_order(&state.store, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}
async fn get_order(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(OrderRepo::new(&state.pool).get(id).await?))
}

/// GET /users/{id}/orders - a user's orders, newest first
async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    ValidId(user_id): ValidId,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Order>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(
        OrderRepo::new(&state.pool).list_for_user(user_id, page).await?,
    ))
}

/// Order routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/users/{id}/orders", get(list_user_orders))
}

#[cfg(test)]
mod tests {
    use crate::http::routes::testing::send;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn zero_quantity_is_400() {
        let (status, body) = send(
            "POST",
            "/orders",
            Some(json!({"user_id": 1, "product_id": 1, "quantity": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn negative_quantity_is_400() {
        let (status, _) = send(
            "POST",
            "/orders",
            Some(json!({"user_id": 1, "product_id": 1, "quantity": -4})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_quantity_is_400() {
        let (status, _) = send(
            "POST",
            "/orders",
            Some(json!({"user_id": 1, "product_id": 1, "quantity": 3_000_000_000_i64})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let (status, _) = send("POST", "/orders", Some(json!({"user_id": 1}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn bad_order_id_is_400() {
        let (status, _) = send("GET", "/orders/x", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_user_id_in_order_listing_is_400() {
        let (status, _) = send("GET", "/users/-1/orders", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
