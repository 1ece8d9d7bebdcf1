use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::StoreConfig;
use crate::core::database::map_write_error;
use crate::core::error::{AppError, Result};
use crate::features::cart::dtos::{merged_quantity, AddCartItemDto, CartDto, UpdateCartItemDto};
use crate::features::cart::models::CartLineRow;
use crate::features::products::models::{Product, ProductStatus};
use crate::features::products::services::PRODUCT_COLUMNS;
use crate::shared::constants::MAX_LINE_QUANTITY;

pub(crate) const CART_LINE_SELECT: &str = r#"
    SELECT ci.id, ci.user_id, ci.product_id, ci.quantity, ci.size, ci.color, ci.created_at,
           p.name AS product_name, p.slug AS product_slug,
           p.regular_price, p.sale_price, p.stock_status, p.stock_quantity, p.manage_stock,
           p.status AS product_status,
           (SELECT i.url FROM product_images i
             WHERE i.product_id = p.id
             ORDER BY i.is_primary DESC, i.sort_order
             LIMIT 1) AS image_url
    FROM cart_items ci
    JOIN products p ON p.id = ci.product_id
"#;

/// Service for the signed-in customer's cart
pub struct CartService {
    pool: PgPool,
    store: StoreConfig,
}

impl CartService {
    pub fn new(pool: PgPool, store: StoreConfig) -> Self {
        Self { pool, store }
    }

    async fn lines(&self, user_id: Uuid) -> Result<Vec<CartLineRow>> {
        let query = format!(
            "{} WHERE ci.user_id = $1 ORDER BY ci.created_at, ci.id",
            CART_LINE_SELECT
        );

        sqlx::query_as::<_, CartLineRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load cart: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartDto> {
        let lines = self.lines(user_id).await?;
        Ok(CartDto::from_lines(
            lines.into_iter().map(Into::into).collect(),
            &self.store,
        ))
    }

    /// Add a product to the cart, merging with an existing line for the same
    /// product, size and color
    pub async fn add_item(&self, user_id: Uuid, dto: AddCartItemDto) -> Result<CartDto> {
        let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(dto.product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", dto.product_id)))?;

        if product.status != ProductStatus::Active {
            return Err(AppError::BadRequest(format!(
                "Product '{}' is not available for purchase",
                product.name
            )));
        }

        let sizes = self.option_names("product_sizes", product.id).await?;
        let colors = self.option_names("product_colors", product.id).await?;
        let size = match_option("size", &sizes, dto.size.as_deref())?;
        let color = match_option("color", &colors, dto.color.as_deref())?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The conflict branch locks the existing line, so concurrent adds merge
        let merged: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity, size, color)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ON CONSTRAINT cart_items_unique_line DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity,
                updated_at = NOW()
            WHERE cart_items.quantity + EXCLUDED.quantity <= $6
            RETURNING quantity
            "#,
        )
        .bind(user_id)
        .bind(product.id)
        .bind(dto.quantity)
        .bind(&size)
        .bind(&color)
        .bind(MAX_LINE_QUANTITY)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error("Cart item", e))?;

        let quantity = merged_quantity(merged)?;
        if !product.can_fulfil(quantity) {
            return Err(AppError::BadRequest(format!(
                "Only {} of '{}' left in stock",
                product.stock_quantity.max(0),
                product.name
            )));
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Cart item added: user_id={}, product_id={}, quantity={}",
            user_id,
            product.id,
            quantity
        );

        self.get_cart(user_id).await
    }

    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        dto: UpdateCartItemDto,
    ) -> Result<CartDto> {
        let query = format!("{} WHERE ci.id = $1 AND ci.user_id = $2", CART_LINE_SELECT);
        let mut line = sqlx::query_as::<_, CartLineRow>(&query)
            .bind(item_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Cart item {} not found", item_id)))?;

        line.quantity = dto.quantity;
        if !line.is_available() {
            return Err(AppError::BadRequest(format!(
                "Only {} of '{}' left in stock",
                line.stock_quantity.max(0),
                line.product_name
            )));
        }

        sqlx::query(
            "UPDATE cart_items SET quantity = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(dto.quantity)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.get_cart(user_id).await
    }

    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<CartDto> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cart item {} not found", item_id)));
        }

        self.get_cart(user_id).await
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<CartDto> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        tracing::info!("Cart cleared: user_id={}", user_id);
        Ok(CartDto::from_lines(Vec::new(), &self.store))
    }

    async fn option_names(&self, table: &str, product_id: Uuid) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(&format!(
            "SELECT name FROM {} WHERE product_id = $1",
            table
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}

/// Resolve a requested size/color against the product's options.
///
/// Products without options take no value (stored as an empty string).
/// Otherwise the request must name one of the options, case-insensitively,
/// and the canonical option name is returned.
pub fn match_option(label: &str, options: &[String], requested: Option<&str>) -> Result<String> {
    let requested = requested.map(str::trim).unwrap_or_default();

    if options.is_empty() {
        return Ok(String::new());
    }

    if requested.is_empty() {
        return Err(AppError::Validation(format!("Please select a {}", label)));
    }

    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(requested))
        .cloned()
        .ok_or_else(|| {
            AppError::Validation(format!(
                "'{}' is not an available {} for this product",
                requested, label
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_match_option_without_options() {
        assert_eq!(match_option("size", &[], None).unwrap(), "");
        assert_eq!(match_option("size", &[], Some("XL")).unwrap(), "");
    }

    #[test]
    fn test_match_option_is_case_insensitive() {
        let sizes = options(&["S", "M", "XL"]);
        assert_eq!(match_option("size", &sizes, Some(" xl ")).unwrap(), "XL");
    }

    #[test]
    fn test_match_option_requires_a_known_value() {
        let colors = options(&["Sand", "Navy"]);
        assert!(matches!(
            match_option("color", &colors, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            match_option("color", &colors, Some("Red")),
            Err(AppError::Validation(_))
        ));
    }
}
