use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::orders::models::{
    Order, OrderItem, OrderListRow, OrderStatus, PaymentStatus, ShippingAddress,
};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::{validate_non_negative_amount, validate_not_blank};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_quantity() -> i32 {
    1
}

// Query params for the back-office order list
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct OrderQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    pub status: Option<OrderStatus>,

    /// Search by order number or customer name
    pub search: Option<String>,
}

impl OrderQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.clamp(1, MAX_PAGE),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ShippingAddressDto {
    #[validate(length(min = 1, max = 120), custom(function = "validate_not_blank"))]
    pub full_name: String,

    #[validate(length(min = 5, max = 30, message = "phone must be between 5 and 30 characters"))]
    pub phone: String,

    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub address_line1: String,

    #[validate(length(max = 200))]
    pub address_line2: Option<String>,

    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub city: String,

    #[validate(length(max = 100))]
    pub state: Option<String>,

    #[validate(length(min = 1, max = 20), custom(function = "validate_not_blank"))]
    pub postal_code: String,

    #[validate(length(min = 2, max = 60), custom(function = "validate_not_blank"))]
    pub country: String,
}

/// Checkout request: the cart becomes an order shipped to this address
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutDto {
    #[validate(nested)]
    pub shipping_address: ShippingAddressDto,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusDto {
    pub status: OrderStatus,

    /// Optional payment status change applied together with the status
    pub payment_status: Option<PaymentStatus>,
}

/// Back-office request to add a line to an existing order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddOrderItemDto {
    pub product_id: Uuid,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999, message = "quantity must be between 1 and 999"))]
    pub quantity: i32,

    #[validate(length(max = 30))]
    pub size: Option<String>,

    #[validate(length(max = 60))]
    pub color: Option<String>,

    /// Overrides the product's current effective price
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddressResponseDto {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ShippingAddress> for ShippingAddressResponseDto {
    fn from(a: ShippingAddress) -> Self {
        Self {
            full_name: a.full_name,
            phone: a.phone,
            address_line1: a.address_line1,
            address_line2: a.address_line2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemDto {
    pub id: Uuid,
    /// None once the product has been deleted from the catalog
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub product_slug: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub line_total: Decimal,
}

impl From<OrderItem> for OrderItemDto {
    fn from(i: OrderItem) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            product_slug: i.product_slug,
            image_url: i.image_url,
            unit_price: i.unit_price,
            quantity: i.quantity,
            size: i.size,
            color: i.color,
            line_total: i.line_total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailDto {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemDto>,
    pub shipping_address: Option<ShippingAddressResponseDto>,
    /// Statuses the order can move to next
    pub next_statuses: Vec<OrderStatus>,
    /// Whether items and address can still be changed
    pub editable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderDetailDto {
    pub fn from_parts(
        order: Order,
        items: Vec<OrderItem>,
        address: Option<ShippingAddress>,
    ) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            next_statuses: order.status.next_statuses(),
            editable: order.status.is_editable(),
            status: order.status,
            payment_status: order.payment_status,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            total: order.total,
            currency: order.currency,
            notes: order.notes,
            items: items.into_iter().map(Into::into).collect(),
            shipping_address: address.map(Into::into),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummaryDto {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Decimal,
    pub currency: String,
    pub item_count: i64,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderListRow> for OrderSummaryDto {
    fn from(row: OrderListRow) -> Self {
        let o = row.order;
        Self {
            id: o.id,
            order_number: o.order_number,
            status: o.status,
            payment_status: o.payment_status,
            total: o.total,
            currency: o.currency,
            item_count: row.item_count,
            customer_name: row.customer_name,
            created_at: o.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> serde_json::Value {
        json!({
            "full_name": "Dana Reyes",
            "phone": "+1 555 0100",
            "address_line1": "12 Harbour St",
            "city": "Portland",
            "postal_code": "97201",
            "country": "US"
        })
    }

    #[test]
    fn test_checkout_accepts_complete_address() {
        let dto: CheckoutDto = serde_json::from_value(json!({
            "shipping_address": address()
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_checkout_rejects_blank_address_fields() {
        let mut addr = address();
        addr["city"] = json!("  ");
        addr["phone"] = json!("1");

        let dto: CheckoutDto = serde_json::from_value(json!({ "shipping_address": addr })).unwrap();
        let err: crate::core::error::AppError = dto.validate().unwrap_err().into();

        match err {
            crate::core::error::AppError::ValidationFields(fields) => {
                assert!(fields.iter().any(|f| f.starts_with("shipping_address.city:")));
                assert!(fields.iter().any(|f| f.starts_with("shipping_address.phone:")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_parses_lowercase() {
        let dto: UpdateOrderStatusDto =
            serde_json::from_value(json!({ "status": "shipped" })).unwrap();
        assert_eq!(dto.status, OrderStatus::Shipped);
        assert!(dto.payment_status.is_none());
    }
}
