use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/{slug}", get(handlers::get_product))
        .with_state(service)
}

pub fn admin_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route(
            "/api/admin/products",
            get(handlers::admin_list_products).post(handlers::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            get(handlers::admin_get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn admin_server() -> TestServer {
        let service = Arc::new(ProductService::new(lazy_pool()));
        TestServer::new(with_admin_auth(admin_routes(service))).unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_empty_form() {
        let response = admin_server()
            .post("/api/admin/products")
            .json(&json!({ "name": "", "regular_price": "0" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
        assert!(errors.iter().any(|e| e.starts_with("name:")));
        assert!(errors.iter().any(|e| e.starts_with("regular_price:")));
    }

    #[tokio::test]
    async fn test_update_rejects_sale_price_above_regular() {
        let response = admin_server()
            .put(&format!("/api/admin/products/{}", uuid::Uuid::new_v4()))
            .json(&json!({
                "name": "Linen Shirt",
                "regular_price": "20.00",
                "sale_price": "25.00"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["errors"][0],
            "body: sale_price must be lower than regular_price"
        );
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        admin_server()
            .post("/api/admin/products")
            .content_type("application/json")
            .bytes("{ not json".into())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_customers_cannot_manage_products() {
        let service = Arc::new(ProductService::new(lazy_pool()));
        let server = TestServer::new(with_customer_auth(admin_routes(service))).unwrap();

        server
            .delete(&format!("/api/admin/products/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
