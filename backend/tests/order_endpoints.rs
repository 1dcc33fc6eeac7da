//! End-to-end tests for order placement and order management.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};
use uuid::Uuid;

use backend::domain::Role;
use support::{bearer, init_app, seed_product, seed_user, test_backend};

#[actix_web::test]
async fn placing_an_order_computes_the_total_and_decrements_stock() {
    let backend = test_backend();
    let user = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let spokes = seed_product(&backend, "Spoke set", 45_00, 30).await;
    let app = init_app(backend.state.clone()).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&user))
            .set_json(json!({
                "items": [
                    { "productId": rim.id(), "quantity": 2 },
                    { "productId": spokes.id(), "quantity": 1 }
                ]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["userId"], user.id().to_string());
    // 2 * 21000 + 1 * 4500
    assert_eq!(body["totalCents"], 465_00);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));

    assert_eq!(backend.products.stock_of(rim.id()), Some(4));
    assert_eq!(backend.products.stock_of(spokes.id()), Some(29));
}

#[actix_web::test]
async fn order_items_capture_the_price_at_purchase_time() {
    let backend = test_backend();
    let user = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&user))
            .set_json(json!({ "items": [{ "productId": rim.id(), "quantity": 1 }] }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["items"][0]["productId"], rim.id().to_string());
    assert_eq!(body["items"][0]["unitPriceCents"], 210_00);
}

#[actix_web::test]
async fn insufficient_stock_rejects_the_order_and_leaves_stock_untouched() {
    let backend = test_backend();
    let user = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let spokes = seed_product(&backend, "Spoke set", 45_00, 2).await;
    let app = init_app(backend.state.clone()).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&user))
            .set_json(json!({
                "items": [
                    { "productId": rim.id(), "quantity": 1 },
                    { "productId": spokes.id(), "quantity": 3 }
                ]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "insufficient stock");
    assert_eq!(body["details"]["productId"], spokes.id().to_string());
    assert_eq!(body["details"]["available"], 2);

    // The whole placement rolled back, including the satisfiable line.
    assert_eq!(backend.products.stock_of(rim.id()), Some(6));
    assert_eq!(backend.products.stock_of(spokes.id()), Some(2));
}

#[actix_web::test]
async fn unknown_products_reject_the_order() {
    let backend = test_backend();
    let user = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let app = init_app(backend.state.clone()).await;

    let ghost = Uuid::new_v4();
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&user))
            .set_json(json!({ "items": [{ "productId": ghost, "quantity": 1 }] }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "product not found");
    assert_eq!(body["details"]["productId"], ghost.to_string());
}

#[actix_web::test]
async fn empty_baskets_and_bad_quantities_are_rejected() {
    let backend = test_backend();
    let user = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    let empty = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&user))
            .set_json(json!({ "items": [] }))
            .to_request(),
    )
    .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let zero = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&user))
            .set_json(json!({ "items": [{ "productId": rim.id(), "quantity": 0 }] }))
            .to_request(),
    )
    .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.products.stock_of(rim.id()), Some(6));
}

#[actix_web::test]
async fn placement_requires_a_token() {
    let backend = test_backend();
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .set_json(json!({ "items": [{ "productId": rim.id(), "quantity": 1 }] }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn place(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user: &backend::domain::User,
    product_id: Uuid,
) -> Uuid {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(user))
            .set_json(json!({ "items": [{ "productId": product_id, "quantity": 1 }] }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("order id")
}

#[actix_web::test]
async fn listing_scopes_orders_to_the_caller_unless_admin() {
    let backend = test_backend();
    let ada = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let bob = seed_user(&backend, "bob", "bob@example.com", Role::User).await;
    let admin = seed_user(&backend, "root", "root@example.com", Role::Admin).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    place(&app, &ada, rim.id()).await;
    place(&app, &bob, rim.id()).await;

    let mine = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/orders")
            .insert_header(bearer(&ada))
            .to_request(),
    )
    .await;
    let mine: Value = test::read_body_json(mine).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["userId"], ada.id().to_string());

    let all = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/orders")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    let all: Value = test::read_body_json(all).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn fetching_an_order_is_limited_to_its_owner_or_admin() {
    let backend = test_backend();
    let ada = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let bob = seed_user(&backend, "bob", "bob@example.com", Role::User).await;
    let admin = seed_user(&backend, "root", "root@example.com", Role::Admin).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    let order_id = place(&app, &ada, rim.id()).await;

    let own = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&ada))
            .to_request(),
    )
    .await;
    assert_eq!(own.status(), StatusCode::OK);

    let stranger = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&bob))
            .to_request(),
    )
    .await;
    assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

    let as_admin = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(as_admin.status(), StatusCode::OK);

    let missing = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/orders/{}", Uuid::new_v4()))
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_admins_move_orders_through_statuses() {
    let backend = test_backend();
    let ada = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let admin = seed_user(&backend, "root", "root@example.com", Role::Admin).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    let order_id = place(&app, &ada, rim.id()).await;

    let denied = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&ada))
            .set_json(json!({ "status": "shipped" }))
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let shipped = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&admin))
            .set_json(json!({ "status": "shipped" }))
            .to_request(),
    )
    .await;
    assert_eq!(shipped.status(), StatusCode::OK);
    let body: Value = test::read_body_json(shipped).await;
    assert_eq!(body["status"], "shipped");

    let unknown = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&admin))
            .set_json(json!({ "status": "teleported" }))
            .to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn owners_can_delete_their_own_orders() {
    let backend = test_backend();
    let ada = seed_user(&backend, "ada", "ada@example.com", Role::User).await;
    let bob = seed_user(&backend, "bob", "bob@example.com", Role::User).await;
    let rim = seed_product(&backend, "Alloy rim 18\"", 210_00, 6).await;
    let app = init_app(backend.state.clone()).await;

    let order_id = place(&app, &ada, rim.id()).await;

    let stranger = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&bob))
            .to_request(),
    )
    .await;
    assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/orders/{order_id}"))
            .insert_header(bearer(&ada))
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(!backend.orders.contains(order_id));
}
