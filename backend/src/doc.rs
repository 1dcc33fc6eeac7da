//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct that generates the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer, the request and
//! response schemas, and the bearer token security scheme. Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::order_items::{CreateOrderItemRequest, UpdateOrderItemRequest};
use crate::inbound::http::orders::{
    OrderBody, OrderItemBody, OrderLineRequest, PlaceOrderRequest, UpdateOrderRequest,
};
use crate::inbound::http::products::{ProductBody, ProductRequest};
use crate::inbound::http::users::{
    LoginRequest, ProfileBody, RegisterRequest, TokenResponse, UpdateUserRequest, UserBody,
};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token issued by POST /api/v1/auth/register or /api/v1/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront backend API",
        description = "REST interface for accounts, catalogue, and orders.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::search_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::order_items::list_order_items,
        crate::inbound::http::order_items::get_order_item,
        crate::inbound::http::order_items::create_order_item,
        crate::inbound::http::order_items::update_order_item,
        crate::inbound::http::order_items::delete_order_item,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        UserBody,
        ProfileBody,
        UpdateUserRequest,
        ProductBody,
        ProductRequest,
        PlaceOrderRequest,
        OrderLineRequest,
        UpdateOrderRequest,
        OrderBody,
        OrderItemBody,
        CreateOrderItemRequest,
        UpdateOrderItemRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profile"),
        (name = "users", description = "Account administration"),
        (name = "products", description = "Catalogue reads and administration"),
        (name = "orders", description = "Order placement and management"),
        (name = "order-items", description = "Raw line-item maintenance"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
