use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::features::orders::handlers;
use crate::features::orders::services::OrderService;

pub fn routes(service: Arc<OrderService>) -> Router {
    Router::new()
        .route(
            "/api/orders",
            get(handlers::list_my_orders).post(handlers::create_order),
        )
        .route("/api/orders/{id}", get(handlers::get_my_order))
        .with_state(service)
}

pub fn admin_routes(service: Arc<OrderService>) -> Router {
    Router::new()
        .route("/api/admin/orders", get(handlers::admin_list_orders))
        .route(
            "/api/admin/orders/{id}",
            get(handlers::admin_get_order).delete(handlers::delete_order),
        )
        .route(
            "/api/admin/orders/{id}/status",
            patch(handlers::update_order_status),
        )
        .route(
            "/api/admin/orders/{id}/address",
            put(handlers::update_order_address),
        )
        .route("/api/admin/orders/{id}/items", post(handlers::add_order_item))
        .route(
            "/api/admin/orders/{id}/items/{item_id}",
            delete(handlers::remove_order_item),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StoreConfig;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    fn service() -> Arc<OrderService> {
        Arc::new(OrderService::new(
            lazy_pool(),
            StoreConfig {
                shipping_flat_rate: Decimal::new(500, 2),
                free_shipping_threshold: Some(Decimal::new(10000, 2)),
                currency: "USD".to_string(),
            },
        ))
    }

    #[tokio::test]
    async fn test_checkout_requires_authentication() {
        let server = TestServer::new(routes(service())).unwrap();
        server
            .post("/api/orders")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_checkout_rejects_incomplete_address() {
        let server = TestServer::new(with_customer_auth(routes(service()))).unwrap();

        let response = server
            .post("/api/orders")
            .json(&json!({
                "shipping_address": {
                    "full_name": "Dana Reyes",
                    "phone": "+1 555 0100",
                    "address_line1": "",
                    "city": "Portland",
                    "postal_code": "97201",
                    "country": "US"
                }
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
        assert!(errors
            .iter()
            .any(|e| e.starts_with("shipping_address.address_line1:")));
    }

    #[tokio::test]
    async fn test_admin_order_routes_forbid_customers() {
        let server = TestServer::new(with_customer_auth(admin_routes(service()))).unwrap();

        server
            .get("/api/admin/orders")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .patch(&format!("/api/admin/orders/{}/status", Uuid::new_v4()))
            .json(&json!({ "status": "shipped" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_status_update_rejects_unknown_status() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        server
            .patch(&format!("/api/admin/orders/{}/status", Uuid::new_v4()))
            .json(&json!({ "status": "teleported" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_item_rejects_negative_price_override() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .post(&format!("/api/admin/orders/{}/items", Uuid::new_v4()))
            .json(&json!({
                "product_id": Uuid::new_v4(),
                "quantity": 2,
                "unit_price": "-1.00"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "unit_price: must not be negative");
    }
}
