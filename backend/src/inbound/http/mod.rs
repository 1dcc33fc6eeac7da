//! HTTP adapter: actix-web handlers over the domain ports.

pub mod auth;
pub mod error;
pub mod health;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod state;
pub mod users;

pub use error::ApiResult;
pub use health::HealthState;
pub use state::HttpState;

use actix_web::web;

/// Mount every versioned API route under `/api/v1`.
///
/// Health probes are registered separately by the server so they stay outside
/// the versioned scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .service(users::register)
                    .service(users::login)
                    .service(users::profile),
            )
            .service(
                web::scope("/users")
                    .service(users::list_users)
                    .service(users::get_user)
                    .service(users::update_user)
                    .service(users::delete_user),
            )
            .service(
                web::scope("/products")
                    .service(products::list_products)
                    .service(products::search_products)
                    .service(products::get_product)
                    .service(products::create_product)
                    .service(products::update_product)
                    .service(products::delete_product),
            )
            .service(
                web::scope("/orders")
                    .service(orders::place_order)
                    .service(orders::list_orders)
                    .service(orders::get_order)
                    .service(orders::update_order)
                    .service(orders::delete_order),
            )
            .service(
                web::scope("/order-items")
                    .service(order_items::list_order_items)
                    .service(order_items::get_order_item)
                    .service(order_items::create_order_item)
                    .service(order_items::update_order_item)
                    .service(order_items::delete_order_item),
            ),
    );
}
