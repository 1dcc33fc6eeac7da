//! Raw order-item maintenance handlers. Admin only.
//!
//! These endpoints edit line items directly and never touch stock or the
//! parent order's total; regular purchasing goes through order placement.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{NewOrderItem, OrderItemChanges};
use crate::domain::Error;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::orders::OrderItemBody;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderItemRequest {
    pub quantity: Option<i32>,
    pub unit_price_cents: Option<i64>,
}

fn validated_quantity(quantity: i32) -> Result<i32, Error> {
    if quantity < 1 {
        return Err(Error::invalid_request("item quantity must be at least 1"));
    }
    Ok(quantity)
}

fn validated_unit_price(unit_price_cents: i64) -> Result<i64, Error> {
    if unit_price_cents < 0 {
        return Err(Error::invalid_request("unit price must not be negative"));
    }
    Ok(unit_price_cents)
}

/// List every line item across all orders.
#[utoipa::path(
    get,
    path = "/api/v1/order-items",
    tag = "order-items",
    responses(
        (status = 200, description = "All order items", body = [OrderItemBody]),
        (status = 403, description = "Caller is not an administrator", body = Error)
    )
)]
#[get("")]
pub async fn list_order_items(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let items = state.order_items.list().await?;
    let bodies: Vec<OrderItemBody> = items.iter().map(OrderItemBody::from).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

/// Fetch one line item.
#[utoipa::path(
    get,
    path = "/api/v1/order-items/{id}",
    tag = "order-items",
    params(("id" = Uuid, Path, description = "Order item identifier")),
    responses(
        (status = 200, description = "The requested order item", body = OrderItemBody),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such order item", body = Error)
    )
)]
#[get("/{id}")]
pub async fn get_order_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let item = state
        .order_items
        .find_by_id(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("order item not found"))?;
    Ok(HttpResponse::Ok().json(OrderItemBody::from(&item)))
}

/// Insert a line item against an existing order.
#[utoipa::path(
    post,
    path = "/api/v1/order-items",
    tag = "order-items",
    request_body = CreateOrderItemRequest,
    responses(
        (status = 201, description = "Order item created", body = OrderItemBody),
        (status = 400, description = "Validation failed or parent record missing", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error)
    )
)]
#[post("")]
pub async fn create_order_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    body: web::Json<CreateOrderItemRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let body = body.into_inner();
    let item = state
        .order_items
        .create(NewOrderItem {
            order_id: body.order_id,
            product_id: body.product_id,
            quantity: validated_quantity(body.quantity)?,
            unit_price_cents: validated_unit_price(body.unit_price_cents)?,
        })
        .await?;
    Ok(HttpResponse::Created().json(OrderItemBody::from(&item)))
}

/// Update a line item's quantity or captured unit price.
#[utoipa::path(
    put,
    path = "/api/v1/order-items/{id}",
    tag = "order-items",
    params(("id" = Uuid, Path, description = "Order item identifier")),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "The updated order item", body = OrderItemBody),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such order item", body = Error)
    )
)]
#[put("/{id}")]
pub async fn update_order_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
    body: web::Json<UpdateOrderItemRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let body = body.into_inner();

    let mut changes = OrderItemChanges::default();
    if let Some(quantity) = body.quantity {
        changes.quantity = Some(validated_quantity(quantity)?);
    }
    if let Some(unit_price_cents) = body.unit_price_cents {
        changes.unit_price_cents = Some(validated_unit_price(unit_price_cents)?);
    }
    if changes.quantity.is_none() && changes.unit_price_cents.is_none() {
        return Err(Error::invalid_request("no fields to update"));
    }

    let item = state
        .order_items
        .update(id.into_inner(), changes)
        .await?
        .ok_or_else(|| Error::not_found("order item not found"))?;
    Ok(HttpResponse::Ok().json(OrderItemBody::from(&item)))
}

/// Delete a line item.
#[utoipa::path(
    delete,
    path = "/api/v1/order-items/{id}",
    tag = "order-items",
    params(("id" = Uuid, Path, description = "Order item identifier")),
    responses(
        (status = 204, description = "Order item deleted"),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such order item", body = Error)
    )
)]
#[delete("/{id}")]
pub async fn delete_order_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    if state.order_items.delete(id.into_inner()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("order item not found"))
    }
}
