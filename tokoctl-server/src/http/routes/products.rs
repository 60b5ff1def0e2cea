//! Product endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use tokoctl_core::models::{NewProduct, Order, Product};

use crate::db::repos::{OrderRepo, ProductRepo};
use crate::db::{Paginated, Pagination, PaginationParams};
use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::http::server::AppState;

/// GET /products - list products with pagination
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Product>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(ProductRepo::new(&state.pool).list(page).await?))
}

/// POST /products - create a product
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = ProductRepo::new(&state.pool).create(&req).await?;
    tracing::info!(product_id = product.id, stock = product.stock, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(ProductRepo::new(&state.pool).get(id).await?))
}

/// GET /products/{id}/orders - orders for a product, newest first
async fn list_product_orders(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Order>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(
        OrderRepo::new(&state.pool).list_for_product(id, page).await?,
    ))
}

/// Product routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/orders", get(list_product_orders))
}
