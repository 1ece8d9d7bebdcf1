//! Price display and discount arithmetic shared by listings, detail views,
//! cart lines and flash-sale cards.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discount in whole percent: `round((regular - sale) / regular * 100)`.
///
/// Returns `None` when there is no effective discount.
pub fn discount_percentage(regular: Decimal, sale: Option<Decimal>) -> Option<i32> {
    let sale = sale?;
    if regular <= Decimal::ZERO || sale < Decimal::ZERO || sale >= regular {
        return None;
    }

    let pct = ((regular - sale) / regular * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    pct.to_i32()
}

/// Price actually charged: the sale price when it undercuts the regular price.
pub fn effective_price(regular: Decimal, sale: Option<Decimal>) -> Decimal {
    match sale {
        Some(sale) if sale >= Decimal::ZERO && sale < regular => sale,
        _ => regular,
    }
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    (unit_price * Decimal::from(quantity)).round_dp(2)
}

/// Price block rendered next to every product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceDisplay {
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub effective_price: Decimal,
    pub discount_percentage: Option<i32>,
    pub on_sale: bool,
}

impl PriceDisplay {
    pub fn new(regular_price: Decimal, sale_price: Option<Decimal>) -> Self {
        let discount_percentage = discount_percentage(regular_price, sale_price);
        Self {
            regular_price,
            sale_price: discount_percentage.and(sale_price),
            effective_price: effective_price(regular_price, sale_price),
            discount_percentage,
            on_sale: discount_percentage.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_discount_percentage_formula() {
        assert_eq!(discount_percentage(d("100"), Some(d("75"))), Some(25));
        assert_eq!(discount_percentage(d("59.99"), Some(d("39.99"))), Some(33));
        assert_eq!(discount_percentage(d("30"), Some(d("20"))), Some(33));
        assert_eq!(discount_percentage(d("30"), Some(d("10"))), Some(67));
        assert_eq!(discount_percentage(d("19.99"), Some(d("0.99"))), Some(95));
        assert_eq!(discount_percentage(d("10"), Some(d("0"))), Some(100));
    }

    #[test]
    fn test_discount_percentage_rounds_half_up() {
        // 12.5% -> 13, 87.5% -> 88
        assert_eq!(discount_percentage(d("8"), Some(d("7"))), Some(13));
        assert_eq!(discount_percentage(d("8"), Some(d("1"))), Some(88));
        // 0.5% -> 1
        assert_eq!(discount_percentage(d("200"), Some(d("199"))), Some(1));
        // 0.4% -> 0
        assert_eq!(discount_percentage(d("250"), Some(d("249"))), Some(0));
    }

    #[test]
    fn test_discount_percentage_without_discount() {
        assert_eq!(discount_percentage(d("100"), None), None);
        assert_eq!(discount_percentage(d("100"), Some(d("100"))), None);
        assert_eq!(discount_percentage(d("100"), Some(d("120"))), None);
        assert_eq!(discount_percentage(d("0"), Some(d("0"))), None);
    }

    #[test]
    fn test_price_display() {
        let p = PriceDisplay::new(d("80"), Some(d("60")));
        assert!(p.on_sale);
        assert_eq!(p.effective_price, d("60"));
        assert_eq!(p.discount_percentage, Some(25));
        assert_eq!(p.sale_price, Some(d("60")));

        let p = PriceDisplay::new(d("80"), Some(d("90")));
        assert!(!p.on_sale);
        assert_eq!(p.effective_price, d("80"));
        assert_eq!(p.sale_price, None);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(d("19.99"), 3), d("59.97"));
        assert_eq!(line_total(d("0.10"), 0), d("0"));
    }
}
