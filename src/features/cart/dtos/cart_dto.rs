use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::config::StoreConfig;
use crate::core::error::{AppError, Result};
use crate::features::cart::models::CartLineRow;
use crate::shared::constants::MAX_LINE_QUANTITY;
use crate::shared::pricing::{line_total, PriceDisplay};

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddCartItemDto {
    pub product_id: Uuid,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999, message = "quantity must be between 1 and 999"))]
    pub quantity: i32,

    #[validate(length(max = 30))]
    pub size: Option<String>,

    #[validate(length(max = 60))]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemDto {
    #[validate(range(min = 1, max = 999, message = "quantity must be between 1 and 999"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: i32,
    #[serde(flatten)]
    pub price: PriceDisplay,
    pub line_total: Decimal,
    /// False when the product was unpublished or no longer has enough stock
    pub available: bool,
}

impl From<CartLineRow> for CartLineDto {
    fn from(row: CartLineRow) -> Self {
        let available = row.is_available();
        let price = PriceDisplay::new(row.regular_price, row.sale_price);
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_slug: row.product_slug,
            image_url: row.image_url,
            size: non_empty(row.size),
            color: non_empty(row.color),
            quantity: row.quantity,
            line_total: line_total(price.effective_price, row.quantity),
            price,
            available,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartDto {
    pub items: Vec<CartLineDto>,
    /// Sum of quantities over all lines
    pub item_count: i32,
    pub subtotal: Decimal,
    /// Shipping estimate for the current subtotal
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub currency: String,
}

impl CartDto {
    pub fn from_lines(items: Vec<CartLineDto>, store: &StoreConfig) -> Self {
        let item_count = items.iter().map(|i| i.quantity).sum();
        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        let shipping_cost = if items.is_empty() {
            Decimal::ZERO
        } else {
            store.shipping_cost_for(subtotal)
        };

        Self {
            items,
            item_count,
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
            currency: store.currency.clone(),
        }
    }
}

/// Quantity of a line after an add.
///
/// `None` means the merge was refused because it would exceed the per-line maximum.
pub fn merged_quantity(merged: Option<i32>) -> Result<i32> {
    merged.ok_or_else(|| {
        AppError::Validation(format!(
            "quantity: a cart line can hold at most {} units",
            MAX_LINE_QUANTITY
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(regular: &str, sale: Option<&str>, qty: i32) -> CartLineDto {
        let price = PriceDisplay::new(d(regular), sale.map(d));
        CartLineDto {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Tee".to_string(),
            product_slug: "tee".to_string(),
            image_url: None,
            size: None,
            color: None,
            quantity: qty,
            line_total: line_total(price.effective_price, qty),
            price,
            available: true,
        }
    }

    fn store() -> StoreConfig {
        StoreConfig {
            shipping_flat_rate: d("5.00"),
            free_shipping_threshold: Some(d("100")),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_cart_totals_use_effective_prices() {
        let cart = CartDto::from_lines(
            vec![line("20.00", Some("15.00"), 2), line("9.99", None, 1)],
            &store(),
        );

        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal, d("39.99"));
        assert_eq!(cart.shipping_cost, d("5.00"));
        assert_eq!(cart.total, d("44.99"));
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let cart = CartDto::from_lines(vec![line("60.00", None, 2)], &store());
        assert_eq!(cart.shipping_cost, Decimal::ZERO);
        assert_eq!(cart.total, d("120.00"));
    }

    #[test]
    fn test_empty_cart_has_no_shipping() {
        let cart = CartDto::from_lines(Vec::new(), &store());
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn test_merge_over_line_maximum_is_rejected() {
        assert_eq!(merged_quantity(Some(5)).unwrap(), 5);
        assert!(matches!(
            merged_quantity(None),
            Err(AppError::Validation(msg)) if msg.contains("999")
        ));
    }
}
