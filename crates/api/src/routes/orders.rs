//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CourierId, OrderId, OrderState, ProductId, StoreId};
use domain::{DraftItem, OrderDraft, OrderService, ValidationError};
use serde::{Deserialize, Serialize};
use storage::{
    CustomerInfo, GrantDirectory, LineItem, OrderFilter, OrderRecord, OrderStore, ProductCatalog,
};

use crate::auth::AuthenticatedActor;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, C: ProductCatalog, G: GrantDirectory> {
    pub order_service: OrderService<S, C, G>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub store_id: i64,
    pub customer: CustomerInfo,
    pub items: Vec<DraftItem>,
}

#[derive(Deserialize)]
pub struct UpdateStateRequest {
    pub state: String,
    pub failure_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub store_id: i64,
    pub state: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Comma-separated product ids.
    pub product_ids: Option<String>,
    pub courier_id: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub store_id: i64,
    pub courier_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub state: String,
    pub total_cents: i64,
    pub failure_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            id: order.id.as_i64(),
            store_id: order.store_id.as_i64(),
            courier_id: order.courier_id.map(|id| id.as_i64()),
            customer_name: order.customer.name,
            customer_phone: order.customer.phone,
            customer_address: order.customer.address,
            state: order.state.as_str().to_string(),
            total_cents: order.total.cents(),
            failure_note: order.failure_note,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<LineItem> for OrderItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            product_id: item.product_id.as_i64(),
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            subtotal_cents: item.subtotal.cents(),
        }
    }
}

// -- Handlers --

/// POST /orders — create a new order for a store.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: OrderStore + 'static, C: ProductCatalog + 'static, G: GrantDirectory + 'static>(
    State(state): State<Arc<AppState<S, C, G>>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let draft = OrderDraft {
        customer: req.customer,
        items: req.items,
    };

    let order = state
        .order_service
        .create(&actor, StoreId::new(req.store_id), draft)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/:id — fetch one order.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static, C: ProductCatalog + 'static, G: GrantDirectory + 'static>(
    State(state): State<Arc<AppState<S, C, G>>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.get(&actor, OrderId::new(id)).await?;
    Ok(Json(order.into()))
}

/// GET /orders — list a store's orders, optionally filtered.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static, C: ProductCatalog + 'static, G: GrantDirectory + 'static>(
    State(state): State<Arc<AppState<S, C, G>>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let mut filter = OrderFilter::new();
    if let Some(ref state_str) = query.state {
        filter = filter.state(parse_state(state_str)?);
    }
    if let Some(from) = query.created_from {
        filter = filter.created_from(from);
    }
    if let Some(to) = query.created_to {
        filter = filter.created_to(to);
    }
    if let Some(ref raw) = query.product_ids {
        filter = filter.product_ids(parse_product_ids(raw)?);
    }
    if let Some(courier_id) = query.courier_id {
        filter = filter.courier_id(CourierId::new(courier_id));
    }

    let orders = state
        .order_service
        .list(&actor, StoreId::new(query.store_id), &filter)
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// POST /orders/:id/state — drive the order through a lifecycle transition.
#[tracing::instrument(skip(state, req))]
pub async fn update_state<
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    G: GrantDirectory + 'static,
>(
    State(state): State<Arc<AppState<S, C, G>>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStateRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let requested = parse_state(&req.state)?;

    let order = state
        .order_service
        .update_state(&actor, OrderId::new(id), requested, req.failure_note.as_deref())
        .await?;

    Ok(Json(order.into()))
}

/// POST /orders/:id/claim — claim a pending order for the calling courier.
#[tracing::instrument(skip(state))]
pub async fn claim<S: OrderStore + 'static, C: ProductCatalog + 'static, G: GrantDirectory + 'static>(
    State(state): State<Arc<AppState<S, C, G>>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.claim(&actor, OrderId::new(id)).await?;
    Ok(Json(order.into()))
}

fn parse_state(raw: &str) -> Result<OrderState, ApiError> {
    raw.parse::<OrderState>()
        .map_err(|e| ApiError::Domain(ValidationError::UnknownState(e.0).into()))
}

fn parse_product_ids(raw: &str) -> Result<Vec<ProductId>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map(ProductId::new)
                .map_err(|e| ApiError::BadRequest(format!("Invalid product id {part:?}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_ids() {
        let ids = parse_product_ids("10, 11 ,12").unwrap();
        assert_eq!(
            ids,
            vec![ProductId::new(10), ProductId::new(11), ProductId::new(12)]
        );

        assert!(parse_product_ids("10,abc").is_err());
        assert!(parse_product_ids("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("assigned").unwrap(), OrderState::Assigned);
        assert!(parse_state("in_transit").is_err());
    }
}
