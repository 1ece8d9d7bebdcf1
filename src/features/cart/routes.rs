use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::cart::handlers;
use crate::features::cart::services::CartService;

pub fn routes(service: Arc<CartService>) -> Router {
    Router::new()
        .route(
            "/api/cart",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        .route("/api/cart/items", post(handlers::add_cart_item))
        .route(
            "/api/cart/items/{id}",
            put(handlers::update_cart_item).delete(handlers::remove_cart_item),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StoreConfig;
    use crate::shared::test_helpers::{lazy_pool, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn service() -> Arc<CartService> {
        Arc::new(CartService::new(
            lazy_pool(),
            StoreConfig {
                shipping_flat_rate: Decimal::new(500, 2),
                free_shipping_threshold: None,
                currency: "USD".to_string(),
            },
        ))
    }

    #[tokio::test]
    async fn test_cart_requires_authentication() {
        let server = TestServer::new(routes(service())).unwrap();
        server
            .get("/api/cart")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let server = TestServer::new(with_customer_auth(routes(service()))).unwrap();

        let response = server
            .post("/api/cart/items")
            .json(&json!({ "product_id": uuid::Uuid::new_v4(), "quantity": 0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["errors"][0],
            "quantity: quantity must be between 1 and 999"
        );
    }

    #[tokio::test]
    async fn test_update_rejects_excessive_quantity() {
        let server = TestServer::new(with_customer_auth(routes(service()))).unwrap();

        server
            .put(&format!("/api/cart/items/{}", uuid::Uuid::new_v4()))
            .json(&json!({ "quantity": 5000 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
