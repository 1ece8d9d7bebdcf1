use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::products::models::{can_fulfil, ProductStatus, StockStatus};

/// Cart line joined with the product it points to.
///
/// `size` and `color` are stored as empty strings when the product has no
/// such option, so the per-user uniqueness constraint covers them.
#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub size: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub product_slug: String,
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock_status: StockStatus,
    pub stock_quantity: i32,
    pub manage_stock: bool,
    pub product_status: ProductStatus,
    pub image_url: Option<String>,
}

impl CartLineRow {
    /// Whether the line can be checked out as it stands
    pub fn is_available(&self) -> bool {
        can_fulfil(
            self.product_status,
            self.stock_status,
            self.manage_stock,
            self.stock_quantity,
            self.quantity,
        )
    }
}
