use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::core::database::map_write_error;
use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{
    ProductCategoryDto, ProductChildren, ProductDetailDto, ProductFormDto, ProductQueryParams,
    ProductSort, ProductSummaryDto,
};
use crate::features::products::models::{
    Product, ProductAttribute, ProductColor, ProductImage, ProductListRow, ProductSize,
    ProductStatus, StockStatus,
};
use crate::shared::slug::{resolve_slug, sync_slug};

pub(crate) const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, sku, description, short_description, regular_price, sale_price, stock_status, stock_quantity, manage_stock, status, is_featured, created_at, updated_at";

const LIST_SELECT: &str = r#"
    SELECT p.id, p.category_id, p.name, p.slug, p.sku, p.description, p.short_description,
           p.regular_price, p.sale_price, p.stock_status, p.stock_quantity, p.manage_stock,
           p.status, p.is_featured, p.created_at, p.updated_at,
           c.name AS category_name, c.slug AS category_slug,
           (SELECT i.url FROM product_images i
             WHERE i.product_id = p.id
             ORDER BY i.is_primary DESC, i.sort_order
             LIMIT 1) AS primary_image_url
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

const LIST_COUNT: &str =
    "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id";

/// Price a customer pays: the sale price when it undercuts the regular price
const EFFECTIVE_PRICE_SQL: &str = "(CASE WHEN p.sale_price IS NOT NULL AND p.sale_price < p.regular_price THEN p.sale_price ELSE p.regular_price END)";

/// Service for catalog products
pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Storefront listing: only ACTIVE products, whatever `status` says
    pub async fn list_public(
        &self,
        params: &ProductQueryParams,
    ) -> Result<(Vec<ProductSummaryDto>, i64)> {
        self.list(params, Some(ProductStatus::Active)).await
    }

    /// Back-office listing, optionally filtered by status
    pub async fn list_admin(
        &self,
        params: &ProductQueryParams,
    ) -> Result<(Vec<ProductSummaryDto>, i64)> {
        self.list(params, params.status).await
    }

    async fn list(
        &self,
        params: &ProductQueryParams,
        status: Option<ProductStatus>,
    ) -> Result<(Vec<ProductSummaryDto>, i64)> {
        let pagination = params.pagination();

        let mut count_query = QueryBuilder::<Postgres>::new(LIST_COUNT);
        push_filters(&mut count_query, params, status);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count products: {:?}", e);
                AppError::Database(e)
            })?;

        let mut query = QueryBuilder::<Postgres>::new(LIST_SELECT);
        push_filters(&mut query, params, status);
        query.push(" ORDER BY ").push(order_by(params.sort));
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let rows: Vec<ProductListRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Active featured products, newest first
    pub async fn featured(&self, limit: i64) -> Result<Vec<ProductSummaryDto>> {
        let query = format!(
            "{} WHERE p.status = 'ACTIVE' AND p.is_featured = TRUE ORDER BY p.created_at DESC LIMIT $1",
            LIST_SELECT
        );

        let rows = sqlx::query_as::<_, ProductListRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load featured products: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Active products of a category and its subcategories, newest first
    pub async fn in_category(
        &self,
        category_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProductSummaryDto>> {
        let query = format!(
            r#"{}
            WHERE p.status = 'ACTIVE'
              AND p.category_id IN (
                WITH RECURSIVE tree AS (
                    SELECT id FROM categories WHERE id = $1
                    UNION
                    SELECT child.id FROM categories child JOIN tree ON child.parent_id = tree.id
                )
                SELECT id FROM tree
              )
            ORDER BY p.created_at DESC
            LIMIT $2"#,
            LIST_SELECT
        );

        let rows = sqlx::query_as::<_, ProductListRow>(&query)
            .bind(category_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load category products: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Active products created within the last `days` days, newest first
    pub async fn new_arrivals(&self, days: i32, limit: i64) -> Result<Vec<ProductSummaryDto>> {
        let query = format!(
            r#"{}
            WHERE p.status = 'ACTIVE'
              AND p.created_at >= NOW() - make_interval(days => $1)
            ORDER BY p.created_at DESC
            LIMIT $2"#,
            LIST_SELECT
        );

        let rows = sqlx::query_as::<_, ProductListRow>(&query)
            .bind(days)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load new arrivals: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Active product summaries for the given ids (order not preserved)
    pub async fn active_summaries_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProductSummaryDto>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!("{} WHERE p.status = 'ACTIVE' AND p.id = ANY($1)", LIST_SELECT);

        let rows = sqlx::query_as::<_, ProductListRow>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load products by id: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Product> {
        let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    /// Storefront detail page: ACTIVE products only
    pub async fn get_by_slug(&self, slug: &str) -> Result<ProductDetailDto> {
        let query = format!(
            "SELECT {} FROM products WHERE slug = $1 AND status = 'ACTIVE'",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product by slug: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", slug)))?;

        self.to_detail(product).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ProductDetailDto> {
        let product = self.find_by_id(id).await?;
        self.to_detail(product).await
    }

    async fn to_detail(&self, product: Product) -> Result<ProductDetailDto> {
        let category = match product.category_id {
            Some(category_id) => sqlx::query_as::<_, ProductCategoryDto>(
                "SELECT id, name, slug FROM categories WHERE id = $1",
            )
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?,
            None => None,
        };

        let children = self.load_children(product.id).await?;
        Ok(ProductDetailDto::from_parts(product, category, children))
    }

    async fn load_children(&self, product_id: Uuid) -> Result<ProductChildren> {
        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, url, alt_text, sort_order, is_primary FROM product_images WHERE product_id = $1 ORDER BY sort_order, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let colors = sqlx::query_as::<_, ProductColor>(
            "SELECT id, product_id, name, hex_code FROM product_colors WHERE product_id = $1 ORDER BY name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let sizes = sqlx::query_as::<_, ProductSize>(
            "SELECT id, product_id, name, sort_order FROM product_sizes WHERE product_id = $1 ORDER BY sort_order, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let attributes = sqlx::query_as::<_, ProductAttribute>(
            "SELECT id, product_id, name, value FROM product_attributes WHERE product_id = $1 ORDER BY name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(ProductChildren {
            images,
            colors,
            sizes,
            attributes,
        })
    }

    pub async fn create(&self, dto: ProductFormDto) -> Result<ProductDetailDto> {
        let slug = resolve_slug(&dto.name, dto.slug.as_deref())?;
        let stock_status =
            StockStatus::derive(dto.manage_stock, dto.stock_quantity, dto.stock_status);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            r#"
            INSERT INTO products (
                category_id, name, slug, sku, description, short_description,
                regular_price, sale_price, stock_status, stock_quantity, manage_stock,
                status, is_featured
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(dto.category_id)
            .bind(dto.name.trim())
            .bind(&slug)
            .bind(dto.sku())
            .bind(&dto.description)
            .bind(&dto.short_description)
            .bind(dto.regular_price)
            .bind(dto.sale_price)
            .bind(stock_status)
            .bind(dto.stock_quantity)
            .bind(dto.manage_stock)
            .bind(dto.status)
            .bind(dto.is_featured)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error("Product", e))?;

        replace_children(&mut tx, product.id, &dto).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Product created: id={}, slug={}", product.id, product.slug);

        self.to_detail(product).await
    }

    pub async fn update(&self, id: Uuid, dto: ProductFormDto) -> Result<ProductDetailDto> {
        let existing = self.find_by_id(id).await?;
        let slug = sync_slug(
            &existing.name,
            &existing.slug,
            Some(&dto.name),
            dto.slug.as_deref(),
        )?;
        let stock_status =
            StockStatus::derive(dto.manage_stock, dto.stock_quantity, dto.stock_status);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            r#"
            UPDATE products
            SET category_id = $2,
                name = $3,
                slug = $4,
                sku = $5,
                description = $6,
                short_description = $7,
                regular_price = $8,
                sale_price = $9,
                stock_status = $10,
                stock_quantity = $11,
                manage_stock = $12,
                status = $13,
                is_featured = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(dto.category_id)
            .bind(dto.name.trim())
            .bind(&slug)
            .bind(dto.sku())
            .bind(&dto.description)
            .bind(&dto.short_description)
            .bind(dto.regular_price)
            .bind(dto.sale_price)
            .bind(stock_status)
            .bind(dto.stock_quantity)
            .bind(dto.manage_stock)
            .bind(dto.status)
            .bind(dto.is_featured)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error("Product", e))?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        replace_children(&mut tx, product.id, &dto).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Product updated: id={}, slug={}", product.id, product.slug);

        self.to_detail(product).await
    }

    /// Delete a product. Order lines keep their snapshot; cart lines and
    /// flash-sale entries go with it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("Product", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        tracing::info!("Product deleted: id={}", id);
        Ok(())
    }
}

/// Replace images, colors, sizes and attributes with the ones in the form
async fn replace_children(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    dto: &ProductFormDto,
) -> Result<()> {
    for table in [
        "product_images",
        "product_colors",
        "product_sizes",
        "product_attributes",
    ] {
        sqlx::query(&format!("DELETE FROM {} WHERE product_id = $1", table))
            .bind(product_id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
    }

    for image in dto.normalized_images() {
        sqlx::query(
            "INSERT INTO product_images (product_id, url, alt_text, sort_order, is_primary) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(image.sort_order)
        .bind(image.is_primary)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;
    }

    for color in &dto.colors {
        sqlx::query("INSERT INTO product_colors (product_id, name, hex_code) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(color.name.trim())
            .bind(&color.hex_code)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
    }

    // Sizes keep the order in which the merchant listed them
    for (index, size) in dto.sizes.iter().enumerate() {
        sqlx::query("INSERT INTO product_sizes (product_id, name, sort_order) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(size.name.trim())
            .bind(index as i32)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
    }

    for attribute in &dto.attributes {
        sqlx::query("INSERT INTO product_attributes (product_id, name, value) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(attribute.name.trim())
            .bind(&attribute.value)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
    }

    Ok(())
}

fn push_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    params: &ProductQueryParams,
    status: Option<ProductStatus>,
) {
    query.push(" WHERE TRUE");

    if let Some(status) = status {
        query.push(" AND p.status = ").push_bind(status);
    }

    if let Some(category) = params.category.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(
                " AND p.category_id IN (WITH RECURSIVE tree AS (SELECT id FROM categories WHERE slug = ",
            )
            .push_bind(category.to_string())
            .push(
                " UNION SELECT child.id FROM categories child JOIN tree ON child.parent_id = tree.id) SELECT id FROM tree)",
            );
    }

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.sku ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.short_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(featured) = params.featured {
        query.push(" AND p.is_featured = ").push_bind(featured);
    }

    match params.on_sale {
        Some(true) => {
            query.push(" AND p.sale_price IS NOT NULL AND p.sale_price < p.regular_price");
        }
        Some(false) => {
            query.push(" AND (p.sale_price IS NULL OR p.sale_price >= p.regular_price)");
        }
        None => {}
    }

    if let Some(min_price) = params.min_price {
        query
            .push(" AND ")
            .push(EFFECTIVE_PRICE_SQL)
            .push(" >= ")
            .push_bind(min_price);
    }

    if let Some(max_price) = params.max_price {
        query
            .push(" AND ")
            .push(EFFECTIVE_PRICE_SQL)
            .push(" <= ")
            .push_bind(max_price);
    }
}

fn order_by(sort: ProductSort) -> String {
    match sort {
        ProductSort::Newest => "p.created_at DESC, p.id".to_string(),
        ProductSort::PriceAsc => format!("{} ASC, p.id", EFFECTIVE_PRICE_SQL),
        ProductSort::PriceDesc => format!("{} DESC, p.id", EFFECTIVE_PRICE_SQL),
        ProductSort::Name => "p.name ASC, p.id".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn params() -> ProductQueryParams {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }

    #[test]
    fn test_filters_bind_values_instead_of_inlining() {
        let mut p = params();
        p.search = Some("linen'; DROP TABLE products; --".to_string());
        p.category = Some("shirts".to_string());
        p.min_price = Some(Decimal::new(10, 0));

        let mut query = QueryBuilder::<Postgres>::new(LIST_COUNT);
        push_filters(&mut query, &p, Some(ProductStatus::Active));
        let sql = query.sql();

        assert!(!sql.contains("DROP TABLE"));
        assert!(!sql.contains("shirts"));
        assert!(sql.contains("p.status = $1"));
        assert!(sql.contains("slug = $2"));
        assert!(sql.contains("p.name ILIKE $3"));
        assert!(sql.contains(">= $6"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let mut p = params();
        p.search = Some("   ".to_string());

        let mut query = QueryBuilder::<Postgres>::new(LIST_COUNT);
        push_filters(&mut query, &p, None);
        assert!(!query.sql().contains("ILIKE"));
    }

    #[test]
    fn test_order_by_uses_effective_price() {
        assert!(order_by(ProductSort::PriceAsc).starts_with(EFFECTIVE_PRICE_SQL));
        assert!(order_by(ProductSort::PriceDesc).contains("DESC"));
        assert_eq!(order_by(ProductSort::Newest), "p.created_at DESC, p.id");
    }
}
