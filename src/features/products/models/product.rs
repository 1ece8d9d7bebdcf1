use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Publication status enum matching database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "DRAFT"),
            ProductStatus::Active => write!(f, "ACTIVE"),
            ProductStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// Stock availability enum matching database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "stock_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
}

impl StockStatus {
    /// Stock status to persist for a product.
    ///
    /// With `manage_stock` the status follows the quantity; otherwise the
    /// status chosen by the merchant is kept.
    pub fn derive(manage_stock: bool, quantity: i32, requested: StockStatus) -> Self {
        if !manage_stock {
            return requested;
        }
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else {
            StockStatus::InStock
        }
    }
}

/// Database model for product
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock_status: StockStatus,
    pub stock_quantity: i32,
    pub manage_stock: bool,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether a customer can currently buy `quantity` units
    pub fn can_fulfil(&self, quantity: i32) -> bool {
        can_fulfil(
            self.status,
            self.stock_status,
            self.manage_stock,
            self.stock_quantity,
            quantity,
        )
    }
}

/// Purchasability rule shared by product pages, the cart and checkout
pub fn can_fulfil(
    status: ProductStatus,
    stock_status: StockStatus,
    manage_stock: bool,
    stock_quantity: i32,
    quantity: i32,
) -> bool {
    if status != ProductStatus::Active {
        return false;
    }
    match stock_status {
        StockStatus::OutOfStock => false,
        StockStatus::OnBackorder => true,
        StockStatus::InStock => !manage_stock || stock_quantity >= quantity,
    }
}

/// Product row joined with its category and primary image, used by listings
#[derive(Debug, Clone, FromRow)]
pub struct ProductListRow {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub primary_image_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductColor {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub hex_code: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductSize {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductAttribute {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(status: ProductStatus, stock: StockStatus, manage: bool, qty: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Linen Shirt".to_string(),
            slug: "linen-shirt".to_string(),
            sku: None,
            description: None,
            short_description: None,
            regular_price: Decimal::new(4999, 2),
            sale_price: None,
            stock_status: stock,
            stock_quantity: qty,
            manage_stock: manage,
            status,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_status_derived_from_quantity_when_managed() {
        assert_eq!(
            StockStatus::derive(true, 0, StockStatus::InStock),
            StockStatus::OutOfStock
        );
        assert_eq!(
            StockStatus::derive(true, 5, StockStatus::OutOfStock),
            StockStatus::InStock
        );
        assert_eq!(
            StockStatus::derive(false, 0, StockStatus::OnBackorder),
            StockStatus::OnBackorder
        );
    }

    #[test]
    fn test_can_fulfil() {
        use ProductStatus::*;
        use StockStatus::*;

        assert!(product(Active, InStock, false, 0).can_fulfil(10));
        assert!(product(Active, InStock, true, 3).can_fulfil(3));
        assert!(!product(Active, InStock, true, 3).can_fulfil(4));
        assert!(product(Active, OnBackorder, true, 0).can_fulfil(2));
        assert!(!product(Active, OutOfStock, false, 10).can_fulfil(1));
        assert!(!product(Draft, InStock, false, 10).can_fulfil(1));
        assert!(!product(Archived, InStock, false, 10).can_fulfil(1));
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_value(ProductStatus::Active).unwrap(),
            serde_json::json!("ACTIVE")
        );
        assert_eq!(
            serde_json::to_value(StockStatus::OnBackorder).unwrap(),
            serde_json::json!("on_backorder")
        );
    }
}
