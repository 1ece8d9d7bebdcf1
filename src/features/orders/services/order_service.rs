use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::core::config::StoreConfig;
use crate::core::error::{AppError, Result};
use crate::features::cart::models::CartLineRow;
use crate::features::cart::services::{match_option, CART_LINE_SELECT};
use crate::features::orders::dtos::{
    AddOrderItemDto, CheckoutDto, OrderDetailDto, OrderQueryParams, OrderSummaryDto,
    ShippingAddressDto, UpdateOrderStatusDto,
};
use crate::features::orders::models::{
    format_order_number, order_totals, Order, OrderItem, OrderListRow, OrderStatus,
    PaymentStatus, ShippingAddress,
};
use crate::features::products::models::Product;
use crate::features::products::services::PRODUCT_COLUMNS;
use crate::shared::pricing::{effective_price, line_total};
use crate::shared::types::PaginationQuery;

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, payment_status, subtotal, shipping_cost, total, currency, notes, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, product_slug, image_url, unit_price, quantity, size, color, line_total, created_at";

const ORDER_LIST_SELECT: &str = r#"
    SELECT o.id, o.order_number, o.user_id, o.status, o.payment_status, o.subtotal,
           o.shipping_cost, o.total, o.currency, o.notes, o.created_at, o.updated_at,
           COALESCE(sa.full_name, u.name) AS customer_name,
           (SELECT COALESCE(SUM(oi.quantity), 0) FROM order_items oi WHERE oi.order_id = o.id)::BIGINT AS item_count
    FROM orders o
    LEFT JOIN shipping_addresses sa ON sa.order_id = o.id
    LEFT JOIN users u ON u.id = o.user_id
"#;

const ORDER_LIST_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM orders o
    LEFT JOIN shipping_addresses sa ON sa.order_id = o.id
    LEFT JOIN users u ON u.id = o.user_id
"#;

/// Service for checkout and order management
pub struct OrderService {
    pool: PgPool,
    store: StoreConfig,
}

impl OrderService {
    pub fn new(pool: PgPool, store: StoreConfig) -> Self {
        Self { pool, store }
    }

    async fn next_order_number(&self, tx: &mut Transaction<'_, Postgres>) -> Result<String> {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('order_number_seq')")
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get next order number: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(format_order_number(Utc::now(), seq))
    }

    /// Turn the caller's cart into an order.
    ///
    /// Prices are snapshotted, managed stock is decremented and the cart is
    /// emptied, all in one transaction.
    pub async fn checkout(&self, user_id: Uuid, dto: CheckoutDto) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            "{} WHERE ci.user_id = $1 ORDER BY ci.created_at, ci.id FOR UPDATE OF ci, p",
            CART_LINE_SELECT
        );
        let lines = sqlx::query_as::<_, CartLineRow>(&query)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load cart for checkout: {:?}", e);
                AppError::Database(e)
            })?;

        if lines.is_empty() {
            return Err(AppError::BadRequest("Your cart is empty".to_string()));
        }

        // Stock is checked against the sum over lines of the same product
        let mut requested: Vec<(Uuid, i32)> = Vec::new();
        for line in &lines {
            match requested.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => requested.push((line.product_id, line.quantity)),
            }
        }
        for line in &lines {
            let total_qty = requested
                .iter()
                .find(|(id, _)| *id == line.product_id)
                .map(|(_, q)| *q)
                .unwrap_or(line.quantity);
            let mut combined = line.clone();
            combined.quantity = total_qty;
            if !combined.is_available() {
                return Err(AppError::BadRequest(format!(
                    "'{}' is no longer available in the requested quantity",
                    line.product_name
                )));
            }
        }

        let priced: Vec<(Decimal, Decimal)> = lines
            .iter()
            .map(|l| {
                let unit = effective_price(l.regular_price, l.sale_price);
                (unit, line_total(unit, l.quantity))
            })
            .collect();
        let line_totals: Vec<Decimal> = priced.iter().map(|(_, t)| *t).collect();
        let (subtotal, _) = order_totals(&line_totals, Decimal::ZERO);
        let shipping_cost = self.store.shipping_cost_for(subtotal);
        let (subtotal, total) = order_totals(&line_totals, shipping_cost);

        let order_number = self.next_order_number(&mut tx).await?;

        let query = format!(
            r#"
            INSERT INTO orders (order_number, user_id, subtotal, shipping_cost, total, currency, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&order_number)
            .bind(user_id)
            .bind(subtotal)
            .bind(shipping_cost)
            .bind(total)
            .bind(&self.store.currency)
            .bind(dto.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create order: {:?}", e);
                AppError::Database(e)
            })?;

        for (line, (unit_price, total)) in lines.iter().zip(priced) {
            insert_item(
                &mut tx,
                order.id,
                NewOrderItem {
                    product_id: line.product_id,
                    product_name: &line.product_name,
                    product_slug: &line.product_slug,
                    image_url: line.image_url.as_deref(),
                    unit_price,
                    quantity: line.quantity,
                    size: &line.size,
                    color: &line.color,
                    line_total: total,
                },
            )
            .await?;
        }

        for (product_id, quantity) in &requested {
            adjust_stock(&mut tx, *product_id, -quantity).await?;
        }

        upsert_address(&mut tx, order.id, &dto.shipping_address).await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Order placed: id={}, number={}, user_id={}, total={}",
            order.id,
            order.order_number,
            user_id,
            order.total
        );

        self.detail(order).await
    }

    /// Orders placed by a customer, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<OrderSummaryDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let query = format!(
            "{} WHERE o.user_id = $1 ORDER BY o.created_at DESC LIMIT $2 OFFSET $3",
            ORDER_LIST_SELECT
        );
        let rows = sqlx::query_as::<_, OrderListRow>(&query)
            .bind(user_id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list orders: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// An order as seen by its owner; other customers' orders are not found
    pub async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> Result<OrderDetailDto> {
        let order = self.find_by_id(id).await?;
        if order.user_id != user_id {
            return Err(AppError::NotFound(format!("Order {} not found", id)));
        }
        self.detail(order).await
    }

    pub async fn list_admin(
        &self,
        params: &OrderQueryParams,
    ) -> Result<(Vec<OrderSummaryDto>, i64)> {
        let pagination = params.pagination();

        let mut count_query = QueryBuilder::<Postgres>::new(ORDER_LIST_COUNT);
        push_filters(&mut count_query, params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count orders: {:?}", e);
                AppError::Database(e)
            })?;

        let mut query = QueryBuilder::<Postgres>::new(ORDER_LIST_SELECT);
        push_filters(&mut query, params);
        query.push(" ORDER BY o.created_at DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let rows: Vec<OrderListRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list orders: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<OrderDetailDto> {
        let order = self.find_by_id(id).await?;
        self.detail(order).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        dto: UpdateOrderStatusDto,
    ) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let order = lock_order(&mut tx, id).await?;

        if !order.status.can_transition_to(dto.status) {
            return Err(AppError::BadRequest(format!(
                "Cannot change order status from {} to {}",
                order.status, dto.status
            )));
        }

        let payment_status = if dto.status == OrderStatus::Refunded {
            PaymentStatus::Refunded
        } else {
            dto.payment_status.unwrap_or(order.payment_status)
        };

        if dto.status == order.status && payment_status == order.payment_status {
            tx.rollback().await.map_err(AppError::Database)?;
            return self.detail(order).await;
        }

        // Cancelling before shipment puts the goods back on the shelf
        if dto.status == OrderStatus::Cancelled && order.status.is_editable() {
            for item in load_items(&mut tx, id).await? {
                if let Some(product_id) = item.product_id {
                    adjust_stock(&mut tx, product_id, item.quantity).await?;
                }
            }
        }

        let query = format!(
            r#"
            UPDATE orders
            SET status = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let updated = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(dto.status)
            .bind(payment_status)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Order status changed: id={}, {} -> {}",
            id,
            order.status,
            updated.status
        );

        self.detail(updated).await
    }

    pub async fn update_address(
        &self,
        id: Uuid,
        dto: ShippingAddressDto,
    ) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let order = lock_order(&mut tx, id).await?;
        ensure_editable(&order)?;

        upsert_address(&mut tx, id, &dto).await?;
        let order = touch_order(&mut tx, id).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Order shipping address updated: id={}", id);
        self.detail(order).await
    }

    pub async fn add_item(&self, id: Uuid, dto: AddOrderItemDto) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let order = lock_order(&mut tx, id).await?;
        ensure_editable(&order)?;

        let query = format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(dto.product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", dto.product_id)))?;

        if !product.can_fulfil(dto.quantity) {
            return Err(AppError::BadRequest(format!(
                "'{}' is not available in the requested quantity",
                product.name
            )));
        }

        let sizes: Vec<String> =
            sqlx::query_scalar("SELECT name FROM product_sizes WHERE product_id = $1")
                .bind(product.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        let colors: Vec<String> =
            sqlx::query_scalar("SELECT name FROM product_colors WHERE product_id = $1")
                .bind(product.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        let size = match_option("size", &sizes, dto.size.as_deref())?;
        let color = match_option("color", &colors, dto.color.as_deref())?;

        let image_url: Option<String> = sqlx::query_scalar(
            "SELECT url FROM product_images WHERE product_id = $1 ORDER BY is_primary DESC, sort_order LIMIT 1",
        )
        .bind(product.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let unit_price = dto
            .unit_price
            .unwrap_or_else(|| effective_price(product.regular_price, product.sale_price));

        insert_item(
            &mut tx,
            id,
            NewOrderItem {
                product_id: product.id,
                product_name: &product.name,
                product_slug: &product.slug,
                image_url: image_url.as_deref(),
                unit_price,
                quantity: dto.quantity,
                size: &size,
                color: &color,
                line_total: line_total(unit_price, dto.quantity),
            },
        )
        .await?;
        adjust_stock(&mut tx, product.id, -dto.quantity).await?;

        let order = recalculate_totals(&mut tx, &order).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Order item added: order_id={}, product_id={}, quantity={}",
            id,
            product.id,
            dto.quantity
        );

        self.detail(order).await
    }

    pub async fn remove_item(&self, id: Uuid, item_id: Uuid) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let order = lock_order(&mut tx, id).await?;
        ensure_editable(&order)?;

        let items = load_items(&mut tx, id).await?;
        let item = items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(format!("Order item {} not found", item_id)))?;

        if items.len() == 1 {
            return Err(AppError::BadRequest(
                "An order must keep at least one item; cancel the order instead".to_string(),
            ));
        }

        sqlx::query("DELETE FROM order_items WHERE id = $1 AND order_id = $2")
            .bind(item_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(product_id) = item.product_id {
            adjust_stock(&mut tx, product_id, item.quantity).await?;
        }

        let order = recalculate_totals(&mut tx, &order).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Order item removed: order_id={}, item_id={}", id, item_id);
        self.detail(order).await
    }

    /// Delete an order with its items and address. Unshipped stock is restored.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let order = lock_order(&mut tx, id).await?;

        if order.status.is_editable() {
            for item in load_items(&mut tx, id).await? {
                if let Some(product_id) = item.product_id {
                    adjust_stock(&mut tx, product_id, item.quantity).await?;
                }
            }
        }

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Order deleted: id={}, number={}", id, order.order_number);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Order> {
        let query = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get order: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))
    }

    async fn detail(&self, order: Order) -> Result<OrderDetailDto> {
        let query = format!(
            "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
            ORDER_ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(order.id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let address = sqlx::query_as::<_, ShippingAddress>(
            r#"
            SELECT id, order_id, full_name, phone, address_line1, address_line2,
                   city, state, postal_code, country, updated_at
            FROM shipping_addresses
            WHERE order_id = $1
            "#,
        )
        .bind(order.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(OrderDetailDto::from_parts(order, items, address))
    }
}

struct NewOrderItem<'a> {
    product_id: Uuid,
    product_name: &'a str,
    product_slug: &'a str,
    image_url: Option<&'a str>,
    unit_price: Decimal,
    quantity: i32,
    /// Empty when the product has no such option
    size: &'a str,
    color: &'a str,
    line_total: Decimal,
}

async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    item: NewOrderItem<'_>,
) -> Result<()> {
    let optional = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };

    sqlx::query(
        r#"
        INSERT INTO order_items (
            order_id, product_id, product_name, product_slug, image_url,
            unit_price, quantity, size, color, line_total
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_name)
    .bind(item.product_slug)
    .bind(item.image_url)
    .bind(item.unit_price)
    .bind(item.quantity)
    .bind(optional(item.size))
    .bind(optional(item.color))
    .bind(item.line_total)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert order item: {:?}", e);
        AppError::Database(e)
    })?;

    Ok(())
}

/// Move managed stock by `delta` units and keep the stock status in step.
/// Products without stock management are left untouched.
async fn adjust_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    delta: i32,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = GREATEST(stock_quantity + $2, 0),
            stock_status = CASE
                WHEN GREATEST(stock_quantity + $2, 0) = 0 THEN 'out_of_stock'::stock_status
                ELSE 'in_stock'::stock_status
            END,
            updated_at = NOW()
        WHERE id = $1 AND manage_stock = TRUE
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to adjust stock for product {}: {:?}", product_id, e);
        AppError::Database(e)
    })?;

    Ok(())
}

async fn upsert_address(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    dto: &ShippingAddressDto,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO shipping_addresses (
            order_id, full_name, phone, address_line1, address_line2,
            city, state, postal_code, country
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (order_id) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            phone = EXCLUDED.phone,
            address_line1 = EXCLUDED.address_line1,
            address_line2 = EXCLUDED.address_line2,
            city = EXCLUDED.city,
            state = EXCLUDED.state,
            postal_code = EXCLUDED.postal_code,
            country = EXCLUDED.country,
            updated_at = NOW()
        "#,
    )
    .bind(order_id)
    .bind(dto.full_name.trim())
    .bind(dto.phone.trim())
    .bind(dto.address_line1.trim())
    .bind(dto.address_line2.as_deref().map(str::trim))
    .bind(dto.city.trim())
    .bind(dto.state.as_deref().map(str::trim))
    .bind(dto.postal_code.trim())
    .bind(dto.country.trim())
    .execute(&mut **tx)
    .await
    .map_err(AppError::Database)?;

    Ok(())
}

async fn lock_order(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Order> {
    let query = format!("SELECT {} FROM orders WHERE id = $1 FOR UPDATE", ORDER_COLUMNS);

    sqlx::query_as::<_, Order>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))
}

async fn load_items(tx: &mut Transaction<'_, Postgres>, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let query = format!(
        "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
        ORDER_ITEM_COLUMNS
    );

    sqlx::query_as::<_, OrderItem>(&query)
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(AppError::Database)
}

/// Recompute subtotal and total from the current lines; shipping is kept
async fn recalculate_totals(tx: &mut Transaction<'_, Postgres>, order: &Order) -> Result<Order> {
    let line_totals: Vec<Decimal> =
        sqlx::query_scalar("SELECT line_total FROM order_items WHERE order_id = $1")
            .bind(order.id)
            .fetch_all(&mut **tx)
            .await
            .map_err(AppError::Database)?;

    let (subtotal, total) = order_totals(&line_totals, order.shipping_cost);

    let query = format!(
        r#"
        UPDATE orders
        SET subtotal = $2, total = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        ORDER_COLUMNS
    );

    sqlx::query_as::<_, Order>(&query)
        .bind(order.id)
        .bind(subtotal)
        .bind(total)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)
}

async fn touch_order(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Order> {
    let query = format!(
        "UPDATE orders SET updated_at = NOW() WHERE id = $1 RETURNING {}",
        ORDER_COLUMNS
    );

    sqlx::query_as::<_, Order>(&query)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)
}

fn ensure_editable(order: &Order) -> Result<()> {
    if order.status.is_editable() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Order {} is {} and can no longer be edited",
            order.order_number, order.status
        )))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, params: &OrderQueryParams) {
    query.push(" WHERE TRUE");

    if let Some(status) = params.status {
        query.push(" AND o.status = ").push_bind(status);
    }

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (o.order_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR sa.full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_filters_are_bound() {
        let params: OrderQueryParams = serde_json::from_value(serde_json::json!({
            "status": "pending",
            "search": "ORD-2026"
        }))
        .unwrap();

        let mut query = QueryBuilder::<Postgres>::new(ORDER_LIST_COUNT);
        push_filters(&mut query, &params);
        let sql = query.sql();

        assert!(sql.contains("o.status = $1"));
        assert!(sql.contains("o.order_number ILIKE $2"));
        assert!(sql.contains("u.name ILIKE $4"));
        assert!(!sql.contains("ORD-2026"));
    }

    #[test]
    fn test_ensure_editable() {
        let mut order = Order {
            id: Uuid::new_v4(),
            order_number: "ORD-2026-0000001".to_string(),
            user_id: Uuid::new_v4(),
            status: OrderStatus::Processing,
            payment_status: PaymentStatus::Paid,
            subtotal: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            total: Decimal::ZERO,
            currency: "USD".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(ensure_editable(&order).is_ok());

        order.status = OrderStatus::Shipped;
        assert!(matches!(ensure_editable(&order), Err(AppError::BadRequest(_))));
    }
}
