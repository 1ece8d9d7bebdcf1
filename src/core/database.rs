use crate::core::config::DatabaseConfig;
use crate::core::error::AppError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a write error to a user-facing `AppError`.
///
/// `entity` names the record in conflict messages, e.g. "Category".
pub fn map_write_error(entity: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let field = db_err
                    .constraint()
                    .map(constraint_field)
                    .unwrap_or("value");
                return AppError::Conflict(format!(
                    "{} with this {} already exists",
                    entity, field
                ));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::BadRequest("Referenced record does not exist".to_string());
            }
            _ => {}
        }
    }

    tracing::error!("Failed to write {}: {:?}", entity.to_lowercase(), e);
    AppError::Database(e)
}

/// Extract the column name from constraint names like `products_slug_key`.
fn constraint_field(constraint: &str) -> &str {
    constraint
        .strip_suffix("_key")
        .and_then(|s| s.rsplit('_').next())
        .unwrap_or("value")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field() {
        assert_eq!(constraint_field("products_slug_key"), "slug");
        assert_eq!(constraint_field("products_sku_key"), "sku");
        assert_eq!(constraint_field("cart_items_unique_line"), "value");
    }

    #[test]
    fn test_non_database_error_is_passed_through() {
        let err = map_write_error("Product", sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
