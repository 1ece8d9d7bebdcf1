use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::ORDER_NUMBER_PREFIX;

/// Order fulfilment status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// Whether an order may move from `self` to `to`
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, to) {
            (Pending, Processing) | (Pending, Cancelled) => true,
            (Processing, Shipped) | (Processing, Cancelled) => true,
            (Shipped, Delivered) => true,
            (Delivered, Refunded) => true,
            (Cancelled, Refunded) => true,
            // Same status is a no-op
            (from, to) if from == to => true,
            _ => false,
        }
    }

    /// Statuses reachable from `self`, excluding itself
    pub fn next_statuses(self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| *s != self && self.can_transition_to(*s))
            .collect()
    }

    /// Items and the shipping address can only change before the order ships
    pub fn is_editable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// Payment status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

/// Database model for order
#[derive(Debug, Clone, FromRow)]
pub struct Order {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order joined with list-view extras
#[derive(Debug, Clone, FromRow)]
pub struct OrderListRow {
    #[sqlx(flatten)]
    pub order: Order,
    pub customer_name: Option<String>,
    pub item_count: i64,
}

/// Order line with a snapshot of the product at purchase time
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub product_slug: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ShippingAddress {
    pub id: Uuid,
    pub order_id: Uuid,
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

/// Human-readable order number, e.g. `ORD-2026-0000042`
pub fn format_order_number(created_at: DateTime<Utc>, sequence: i64) -> String {
    format!(
        "{}-{}-{:07}",
        ORDER_NUMBER_PREFIX,
        created_at.year(),
        sequence
    )
}

/// Subtotal and grand total for the given line totals
pub fn order_totals(line_totals: &[Decimal], shipping_cost: Decimal) -> (Decimal, Decimal) {
    let subtotal: Decimal = line_totals.iter().copied().sum();
    (subtotal, subtotal + shipping_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use OrderStatus::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Delivered.can_transition_to(Refunded));
        assert!(Cancelled.can_transition_to(Refunded));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Refunded.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Processing));
    }

    #[test]
    fn test_same_status_is_allowed() {
        for status in OrderStatus::ALL {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn test_next_statuses() {
        assert_eq!(Pending.next_statuses(), vec![Processing, Cancelled]);
        assert_eq!(Shipped.next_statuses(), vec![Delivered]);
        assert!(Refunded.next_statuses().is_empty());
    }

    #[test]
    fn test_editable_statuses() {
        assert!(Pending.is_editable());
        assert!(Processing.is_editable());
        assert!(!Shipped.is_editable());
        assert!(!Cancelled.is_editable());
    }

    #[test]
    fn test_format_order_number() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format_order_number(at, 42), "ORD-2026-0000042");
        assert_eq!(format_order_number(at, 12345678), "ORD-2026-12345678");
    }

    #[test]
    fn test_order_totals() {
        let (subtotal, total) = order_totals(
            &[Decimal::new(1999, 2), Decimal::new(500, 2)],
            Decimal::new(1000, 2),
        );
        assert_eq!(subtotal, Decimal::new(2499, 2));
        assert_eq!(total, Decimal::new(3499, 2));

        let (subtotal, total) = order_totals(&[], Decimal::ZERO);
        assert_eq!(subtotal, Decimal::ZERO);
        assert_eq!(total, Decimal::ZERO);
    }
}
