use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::home_settings::models::{
    CarouselBanner, FeaturedSection, FeaturedSectionType, HeadlineMessage, NewArrivalSection,
    PromotionalBanner, SaleBanner,
};
use crate::features::products::dtos::ProductSummaryDto;
use crate::shared::pricing::PriceDisplay;

/// Promotional banners split by page slot
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PromotionalSlotsDto {
    pub top: Vec<PromotionalBanner>,
    pub middle: Vec<PromotionalBanner>,
    pub bottom: Vec<PromotionalBanner>,
    pub sidebar: Vec<PromotionalBanner>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeaturedSectionDto {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub section_type: FeaturedSectionType,
    pub background_color: Option<String>,
    pub products: Vec<ProductSummaryDto>,
}

impl FeaturedSectionDto {
    pub fn new(section: FeaturedSection, products: Vec<ProductSummaryDto>) -> Self {
        Self {
            id: section.id,
            title: section.title,
            subtitle: section.subtitle,
            description: section.description,
            image_url: section.image_url,
            link_url: section.link_url,
            section_type: section.section_type,
            background_color: section.background_color,
            products,
        }
    }
}

/// Product card priced at the flash price, with a countdown target
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FlashSaleCardDto {
    pub id: Uuid,
    pub product: ProductSummaryDto,
    #[serde(flatten)]
    pub price: PriceDisplay,
    pub ends_at: DateTime<Utc>,
    /// Units left at the flash price; None when unlimited
    pub remaining: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FlashSaleBlockDto {
    pub title: Option<String>,
    pub items: Vec<FlashSaleCardDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewArrivalsDto {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub products: Vec<ProductSummaryDto>,
}

impl NewArrivalsDto {
    pub fn new(section: NewArrivalSection, products: Vec<ProductSummaryDto>) -> Self {
        Self {
            id: section.id,
            title: section.title,
            subtitle: section.subtitle,
            products,
        }
    }
}

/// Everything the storefront home page renders. Disabled sections are empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomePageDto {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub headlines: Vec<HeadlineMessage>,
    pub carousel: Vec<CarouselBanner>,
    pub promotional: PromotionalSlotsDto,
    pub sale_banners: Vec<SaleBanner>,
    pub featured_sections: Vec<FeaturedSectionDto>,
    pub flash_sale: Option<FlashSaleBlockDto>,
    pub new_arrivals: Vec<NewArrivalsDto>,
}
