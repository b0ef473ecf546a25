//! Order handlers

use axum::extract::{Path, Query, State};
use serde_json::{Map, Value};

use super::ApiJson;
use crate::{
    error::Result,
    orders::{NewOrder, Order, OrderPatch},
    pagination::ListQuery,
    responses::{Created, Envelope},
    state::AppState,
};

/// `GET /order?search=`: shoppers look up their orders by name or email
pub async fn search_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<Order>>> {
    let orders = state.orders().search_orders(query.search()).await?;
    Ok(Envelope::success(orders))
}

/// `POST /order`
pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(submission): ApiJson<NewOrder>,
) -> Result<Created<Order>> {
    let order = state.orders().create_order(submission).await?;
    tracing::info!(order_id = %order.id, total_price = order.total_price, "Order placed");
    Ok(Created::new(order))
}

/// `GET /admin/order?page&pageSize&search`
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<Order>>> {
    let page = state.orders().list_orders(&query).await?;
    Ok(Envelope::paged(page))
}

/// `GET /admin/order/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<Order>> {
    let order = state.orders().get_order(&id).await?;
    Ok(Envelope::success(order))
}

/// `PUT /admin/order/{id}` with any of `is_enabled`, `is_picked`, `is_paid`
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Map<String, Value>>,
) -> Result<Envelope<Order>> {
    let patch = OrderPatch::try_from(payload)?;
    let order = state.orders().update_order(&id, &patch).await?;
    Ok(Envelope::success(order))
}
