//! Order handlers.
//!
//! Placement delegates the transactional work (stock checks, decrements,
//! total computation, inserts) to the order repository port so the handler
//! stays a thin validate-and-translate layer.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{validate_lines, Error, Order, OrderItem, OrderStatus};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::state::HttpState;

/// Persisted order line as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemBody {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price in minor currency units at the time of purchase.
    pub unit_price_cents: i64,
}

impl From<&OrderItem> for OrderItemBody {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id(),
            order_id: item.order_id(),
            product_id: item.product_id(),
            quantity: item.quantity(),
            unit_price_cents: item.unit_price_cents(),
        }
    }
}

/// Order with its line items as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    /// Order total in minor currency units.
    pub total_cents: i64,
    pub items: Vec<OrderItemBody>,
}

impl From<&Order> for OrderBody {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            user_id: order.user_id(),
            status: order.status().to_string(),
            total_cents: order.total_cents(),
            items: order.items().iter().map(OrderItemBody::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// One of `pending`, `paid`, `shipped`, or `cancelled`.
    pub status: String,
}

/// Place an order for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderBody),
        (status = 400, description = "Empty basket, bad quantity, unknown product, or insufficient stock", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    )
)]
#[post("")]
pub async fn place_order(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    body: web::Json<PlaceOrderRequest>,
) -> ApiResult<HttpResponse> {
    let requested: Vec<(Uuid, i32)> = body
        .into_inner()
        .items
        .iter()
        .map(|line| (line.product_id, line.quantity))
        .collect();
    let lines =
        validate_lines(&requested).map_err(|e| Error::invalid_request(e.to_string()))?;

    let order = state.orders.place(caller.user_id(), lines).await?;
    Ok(HttpResponse::Created().json(OrderBody::from(&order)))
}

/// List orders: all of them for administrators, the caller's own otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    responses(
        (status = 200, description = "Visible orders", body = [OrderBody]),
        (status = 401, description = "Missing or invalid token", body = Error)
    )
)]
#[get("")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let orders = if caller.role().is_admin() {
        state.orders.list_all().await?
    } else {
        state.orders.list_for_user(caller.user_id()).await?
    };
    let bodies: Vec<OrderBody> = orders.iter().map(OrderBody::from).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

/// Fetch one order. Owner or admin.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "The requested order", body = OrderBody),
        (status = 403, description = "Caller may not view this order", body = Error),
        (status = 404, description = "No such order", body = Error)
    )
)]
#[get("/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let order = state
        .orders
        .find_by_id(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("order not found"))?;
    caller.require_self_or_admin(order.user_id())?;
    Ok(HttpResponse::Ok().json(OrderBody::from(&order)))
}

/// Update an order's status. Admin only; nothing else is mutable here.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order identifier")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "The updated order", body = OrderBody),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such order", body = Error)
    )
)]
#[put("/{id}")]
pub async fn update_order(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let status = body
        .status
        .parse::<OrderStatus>()
        .map_err(|e| Error::invalid_request(e.to_string()))?;
    let order = state
        .orders
        .update_status(id.into_inner(), status)
        .await?
        .ok_or_else(|| Error::not_found("order not found"))?;
    Ok(HttpResponse::Ok().json(OrderBody::from(&order)))
}

/// Delete an order and its items. Owner or admin.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Caller may not delete this order", body = Error),
        (status = 404, description = "No such order", body = Error)
    )
)]
#[delete("/{id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("order not found"))?;
    caller.require_self_or_admin(order.user_id())?;

    if state.orders.delete(id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("order not found"))
    }
}
