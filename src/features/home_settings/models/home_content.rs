use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "carousel_text_position", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CarouselTextPosition {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "promotional_banner_position", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BannerPosition {
    Top,
    #[default]
    Middle,
    Bottom,
    Sidebar,
}

/// Where a featured section gets its products from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "featured_section_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeaturedSectionType {
    /// Products of `category_id` and its subcategories
    Category,
    /// Products flagged `is_featured`
    FeaturedProducts,
    /// Editorial block without products
    #[default]
    Custom,
}

/// A table of home-page content managed from the back office.
///
/// Rows are listed by `sort_order`, then creation time.
pub trait ContentSection:
    for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin + 'static
{
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    /// Human-readable name used in error messages
    const LABEL: &'static str;
}

/// Content shown only inside an optional publishing window
pub trait Scheduled {
    fn is_active(&self) -> bool;
    fn starts_at(&self) -> Option<DateTime<Utc>>;
    fn ends_at(&self) -> Option<DateTime<Utc>>;
}

macro_rules! scheduled {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Scheduled for $ty {
                fn is_active(&self) -> bool {
                    self.is_active
                }
                fn starts_at(&self) -> Option<DateTime<Utc>> {
                    self.starts_at
                }
                fn ends_at(&self) -> Option<DateTime<Utc>> {
                    self.ends_at
                }
            }
        )+
    };
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct CarouselBanner {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub mobile_image_url: Option<String>,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub text_position: CarouselTextPosition,
    pub is_active: bool,
    pub sort_order: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSection for CarouselBanner {
    const TABLE: &'static str = "carousel_banners";
    const COLUMNS: &'static str = "id, title, subtitle, description, image_url, mobile_image_url, button_text, button_link, background_color, text_color, text_position, is_active, sort_order, starts_at, ends_at, created_at, updated_at";
    const LABEL: &'static str = "Carousel banner";
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct PromotionalBanner {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub position: BannerPosition,
    pub is_active: bool,
    pub sort_order: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSection for PromotionalBanner {
    const TABLE: &'static str = "promotional_banners";
    const COLUMNS: &'static str = "id, title, subtitle, image_url, link_url, background_color, text_color, position, is_active, sort_order, starts_at, ends_at, created_at, updated_at";
    const LABEL: &'static str = "Promotional banner";
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct FeaturedSection {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub section_type: FeaturedSectionType,
    pub category_id: Option<Uuid>,
    pub max_products: i32,
    pub background_color: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSection for FeaturedSection {
    const TABLE: &'static str = "featured_sections";
    const COLUMNS: &'static str = "id, title, subtitle, description, image_url, link_url, section_type, category_id, max_products, background_color, is_active, sort_order, created_at, updated_at";
    const LABEL: &'static str = "Featured section";
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct HeadlineMessage {
    pub id: Uuid,
    pub message: String,
    pub link_url: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSection for HeadlineMessage {
    const TABLE: &'static str = "headline_messages";
    const COLUMNS: &'static str = "id, message, link_url, background_color, text_color, is_active, sort_order, starts_at, ends_at, created_at, updated_at";
    const LABEL: &'static str = "Headline message";
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SaleBanner {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub discount_text: Option<String>,
    pub image_url: Option<String>,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSection for SaleBanner {
    const TABLE: &'static str = "sale_banners";
    const COLUMNS: &'static str = "id, title, subtitle, discount_text, image_url, button_text, button_link, background_color, text_color, is_active, sort_order, starts_at, ends_at, created_at, updated_at";
    const LABEL: &'static str = "Sale banner";
}

/// A product sold at a fixed flash price until `ends_at`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct FlashSaleProduct {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(value_type = String)]
    pub flash_price: Decimal,
    /// Units available at the flash price; None means unlimited
    pub stock_limit: Option<i32>,
    pub sold_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlashSaleProduct {
    pub fn is_sold_out(&self) -> bool {
        self.stock_limit
            .is_some_and(|limit| self.sold_count >= limit)
    }
}

impl ContentSection for FlashSaleProduct {
    const TABLE: &'static str = "flash_sale_products";
    const COLUMNS: &'static str = "id, product_id, flash_price, stock_limit, sold_count, starts_at, ends_at, is_active, sort_order, created_at, updated_at";
    const LABEL: &'static str = "Flash sale product";
}

impl Scheduled for FlashSaleProduct {
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.starts_at
    }
    fn ends_at(&self) -> Option<DateTime<Utc>> {
        Some(self.ends_at)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct NewArrivalSection {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub product_limit: i32,
    /// Products created within this many days count as new
    pub days_window: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSection for NewArrivalSection {
    const TABLE: &'static str = "new_arrival_sections";
    const COLUMNS: &'static str = "id, title, subtitle, product_limit, days_window, is_active, sort_order, created_at, updated_at";
    const LABEL: &'static str = "New arrival section";
}

scheduled!(CarouselBanner, PromotionalBanner, HeadlineMessage, SaleBanner);

/// Singleton row of home-page toggles
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct HomePageSettings {
    pub show_headline: bool,
    pub show_carousel: bool,
    pub show_flash_sale: bool,
    pub show_featured: bool,
    pub show_new_arrivals: bool,
    pub show_promotional: bool,
    pub show_sale_banner: bool,
    pub flash_sale_title: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub const HOME_PAGE_SETTINGS_COLUMNS: &str = "show_headline, show_carousel, show_flash_sale, show_featured, show_new_arrivals, show_promotional, show_sale_banner, flash_sale_title, meta_title, meta_description, updated_at";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn flash(stock_limit: Option<i32>, sold_count: i32) -> FlashSaleProduct {
        FlashSaleProduct {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            flash_price: Decimal::new(999, 2),
            stock_limit,
            sold_count,
            starts_at: None,
            ends_at: Utc::now() + Duration::hours(2),
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_flash_sale_sold_out() {
        assert!(!flash(None, 500).is_sold_out());
        assert!(!flash(Some(10), 9).is_sold_out());
        assert!(flash(Some(10), 10).is_sold_out());
    }

    #[test]
    fn test_section_type_wire_names() {
        assert_eq!(
            serde_json::to_value(FeaturedSectionType::FeaturedProducts).unwrap(),
            "featured_products"
        );
        assert_eq!(
            serde_json::from_value::<BannerPosition>(serde_json::json!("sidebar")).unwrap(),
            BannerPosition::Sidebar
        );
    }
}
