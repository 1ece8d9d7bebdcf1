use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Public catalog navigation (no authentication required)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/{slug}", get(handlers::get_category))
        .with_state(service)
}

/// Back-office category management (admin only)
pub fn admin_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/admin/categories",
            get(handlers::admin_list_categories).post(handlers::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            get(handlers::admin_get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/admin/categories/{id}/parent-options",
            get(handlers::admin_parent_options),
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

    fn service() -> Arc<CategoryService> {
        Arc::new(CategoryService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name_before_database() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .post("/api/admin/categories")
            .json(&json!({ "name": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["errors"][0].as_str().unwrap().starts_with("name:"));
    }

    #[tokio::test]
    async fn test_admin_routes_reject_customers() {
        let server = TestServer::new(with_customer_auth(admin_routes(service()))).unwrap();

        server
            .post("/api/admin/categories")
            .json(&json!({ "name": "Shoes" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_routes_require_authentication() {
        let server = TestServer::new(admin_routes(service())).unwrap();

        server
            .get("/api/admin/categories")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
