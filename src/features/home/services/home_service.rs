use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::home::dtos::{
    FeaturedSectionDto, FlashSaleBlockDto, FlashSaleCardDto, HomePageDto, NewArrivalsDto,
    PromotionalSlotsDto,
};
use crate::features::home_settings::models::{
    BannerPosition, CarouselBanner, FeaturedSection, FeaturedSectionType, FlashSaleProduct,
    HeadlineMessage, NewArrivalSection, PromotionalBanner, SaleBanner, Scheduled,
};
use crate::features::home_settings::services::check_flash_price;
use crate::features::home_settings::HomeSettingsService;
use crate::features::products::dtos::ProductSummaryDto;
use crate::features::products::ProductService;
use crate::shared::pricing::PriceDisplay;

/// Whether content is published at `now`.
///
/// Both window bounds are optional; the start is inclusive and the end exclusive.
pub fn is_active_now(
    is_active: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    is_active
        && starts_at.map_or(true, |start| start <= now)
        && ends_at.map_or(true, |end| now < end)
}

fn published<T: Scheduled>(rows: Vec<T>, now: DateTime<Utc>) -> Vec<T> {
    rows.into_iter()
        .filter(|r| is_active_now(r.is_active(), r.starts_at(), r.ends_at(), now))
        .collect()
}

fn group_by_position(banners: Vec<PromotionalBanner>) -> PromotionalSlotsDto {
    let mut slots = PromotionalSlotsDto::default();
    for banner in banners {
        let slot = match banner.position {
            BannerPosition::Top => &mut slots.top,
            BannerPosition::Middle => &mut slots.middle,
            BannerPosition::Bottom => &mut slots.bottom,
            BannerPosition::Sidebar => &mut slots.sidebar,
        };
        slot.push(banner);
    }
    slots
}

/// Pair running flash-sale entries with their products.
///
/// Entries whose product is no longer active, whose stock limit is used up,
/// or whose flash price is no longer below the product's regular price are
/// dropped. Entry order is kept.
fn flash_cards(
    entries: Vec<FlashSaleProduct>,
    products: Vec<ProductSummaryDto>,
) -> Vec<FlashSaleCardDto> {
    let mut by_id: HashMap<Uuid, ProductSummaryDto> =
        products.into_iter().map(|p| (p.id, p)).collect();

    entries
        .into_iter()
        .filter(|e| !e.is_sold_out())
        .filter_map(|entry| {
            let product = by_id.remove(&entry.product_id)?;
            if check_flash_price(entry.flash_price, product.price.regular_price).is_err() {
                return None;
            }
            Some(FlashSaleCardDto {
                id: entry.id,
                price: PriceDisplay::new(product.price.regular_price, Some(entry.flash_price)),
                ends_at: entry.ends_at,
                remaining: entry
                    .stock_limit
                    .map(|limit| (limit - entry.sold_count).max(0)),
                product,
            })
        })
        .collect()
}

/// Composes the storefront home page from the content sections
pub struct HomeService {
    settings: Arc<HomeSettingsService>,
    products: Arc<ProductService>,
}

impl HomeService {
    pub fn new(settings: Arc<HomeSettingsService>, products: Arc<ProductService>) -> Self {
        Self { settings, products }
    }

    pub async fn page(&self) -> Result<HomePageDto> {
        let toggles = self.settings.page_settings().await?;
        let now = Utc::now();

        let headlines = if toggles.show_headline {
            published(self.settings.rows::<HeadlineMessage>(true).await?, now)
        } else {
            Vec::new()
        };

        let carousel = if toggles.show_carousel {
            published(self.settings.rows::<CarouselBanner>(true).await?, now)
        } else {
            Vec::new()
        };

        let promotional = if toggles.show_promotional {
            group_by_position(published(
                self.settings.rows::<PromotionalBanner>(true).await?,
                now,
            ))
        } else {
            PromotionalSlotsDto::default()
        };

        let sale_banners = if toggles.show_sale_banner {
            published(self.settings.rows::<SaleBanner>(true).await?, now)
        } else {
            Vec::new()
        };

        let featured_sections = if toggles.show_featured {
            self.featured_sections().await?
        } else {
            Vec::new()
        };

        let flash_sale = if toggles.show_flash_sale {
            let items = self.flash_sale(now).await?;
            (!items.is_empty()).then(|| FlashSaleBlockDto {
                title: toggles.flash_sale_title.clone(),
                items,
            })
        } else {
            None
        };

        let new_arrivals = if toggles.show_new_arrivals {
            self.new_arrivals().await?
        } else {
            Vec::new()
        };

        Ok(HomePageDto {
            meta_title: toggles.meta_title,
            meta_description: toggles.meta_description,
            headlines,
            carousel,
            promotional,
            sale_banners,
            featured_sections,
            flash_sale,
            new_arrivals,
        })
    }

    async fn featured_sections(&self) -> Result<Vec<FeaturedSectionDto>> {
        let sections = self.settings.rows::<FeaturedSection>(true).await?;
        let mut out = Vec::with_capacity(sections.len());

        for section in sections {
            let limit = i64::from(section.max_products.max(1));
            let products = match (section.section_type, section.category_id) {
                (FeaturedSectionType::Category, Some(category_id)) => {
                    self.products.in_category(category_id, limit).await?
                }
                (FeaturedSectionType::FeaturedProducts, _) => {
                    self.products.featured(limit).await?
                }
                _ => Vec::new(),
            };
            out.push(FeaturedSectionDto::new(section, products));
        }

        Ok(out)
    }

    async fn flash_sale(&self, now: DateTime<Utc>) -> Result<Vec<FlashSaleCardDto>> {
        let entries = published(self.settings.rows::<FlashSaleProduct>(true).await?, now);
        let ids: Vec<Uuid> = entries.iter().map(|e| e.product_id).collect();
        let products = self.products.active_summaries_by_ids(&ids).await?;

        Ok(flash_cards(entries, products))
    }

    async fn new_arrivals(&self) -> Result<Vec<NewArrivalsDto>> {
        let sections = self.settings.rows::<NewArrivalSection>(true).await?;
        let mut out = Vec::with_capacity(sections.len());

        for section in sections {
            let products = self
                .products
                .new_arrivals(section.days_window, i64::from(section.product_limit))
                .await?;
            out.push(NewArrivalsDto::new(section, products));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::models::{ProductStatus, StockStatus};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn product(id: Uuid, regular: i64) -> ProductSummaryDto {
        ProductSummaryDto {
            id,
            name: "Canvas Tote".to_string(),
            slug: "canvas-tote".to_string(),
            sku: None,
            short_description: None,
            price: PriceDisplay::new(Decimal::new(regular, 2), None),
            stock_status: StockStatus::InStock,
            status: ProductStatus::Active,
            is_featured: false,
            primary_image_url: None,
            category: None,
            created_at: Utc::now(),
        }
    }

    fn entry(product_id: Uuid, flash: i64, stock_limit: Option<i32>, sold: i32) -> FlashSaleProduct {
        FlashSaleProduct {
            id: Uuid::new_v4(),
            product_id,
            flash_price: Decimal::new(flash, 2),
            stock_limit,
            sold_count: sold,
            starts_at: None,
            ends_at: Utc::now() + Duration::hours(3),
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn banner(position: BannerPosition) -> PromotionalBanner {
        PromotionalBanner {
            id: Uuid::new_v4(),
            title: "Mid-season".to_string(),
            subtitle: None,
            image_url: "https://cdn.example.com/b.jpg".to_string(),
            link_url: None,
            background_color: None,
            text_color: None,
            position,
            is_active: true,
            sort_order: 0,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_window() {
        let now = Utc::now();
        let hour = Duration::hours(1);

        assert!(is_active_now(true, None, None, now));
        assert!(!is_active_now(false, None, None, now));
        assert!(is_active_now(true, Some(now - hour), Some(now + hour), now));
        assert!(is_active_now(true, Some(now), None, now));
        assert!(!is_active_now(true, Some(now + hour), None, now));
        assert!(!is_active_now(true, None, Some(now), now));
        assert!(!is_active_now(true, Some(now - hour * 2), Some(now - hour), now));
    }

    #[test]
    fn test_expired_flash_sales_are_not_published() {
        let now = Utc::now();
        let mut expired = entry(Uuid::new_v4(), 500, None, 0);
        expired.ends_at = now - Duration::minutes(1);
        let running = entry(Uuid::new_v4(), 500, None, 0);
        let running_id = running.id;

        let kept = published(vec![expired, running], now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, running_id);
    }

    #[test]
    fn test_flash_cards_price_and_remaining() {
        let id = Uuid::new_v4();
        let cards = flash_cards(vec![entry(id, 1500, Some(20), 5)], vec![product(id, 2000)]);

        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.price.effective_price, Decimal::new(1500, 2));
        assert_eq!(card.price.discount_percentage, Some(25));
        assert_eq!(card.remaining, Some(15));
    }

    #[test]
    fn test_flash_cards_skip_sold_out_and_missing_products() {
        let sold_out = Uuid::new_v4();
        let inactive = Uuid::new_v4();

        let cards = flash_cards(
            vec![entry(sold_out, 1000, Some(3), 3), entry(inactive, 1000, None, 0)],
            vec![product(sold_out, 2000)],
        );

        assert!(cards.is_empty());
    }

    #[test]
    fn test_flash_cards_skip_entries_no_longer_discounted() {
        let repriced = Uuid::new_v4();
        let discounted = Uuid::new_v4();

        let cards = flash_cards(
            vec![entry(repriced, 1500, None, 0), entry(discounted, 1500, None, 0)],
            vec![product(repriced, 1500), product(discounted, 1800)],
        );

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].product.id, discounted);
        assert!(cards[0].price.on_sale);
    }

    #[test]
    fn test_promotional_grouping() {
        let slots = group_by_position(vec![
            banner(BannerPosition::Top),
            banner(BannerPosition::Sidebar),
            banner(BannerPosition::Top),
        ]);

        assert_eq!(slots.top.len(), 2);
        assert_eq!(slots.sidebar.len(), 1);
        assert!(slots.middle.is_empty());
        assert!(slots.bottom.is_empty());
    }
}
