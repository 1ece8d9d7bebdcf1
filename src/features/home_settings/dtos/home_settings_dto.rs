use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::{AppError, Result};
use crate::features::home_settings::models::{
    BannerPosition, CarouselBanner, CarouselTextPosition, FeaturedSection, FeaturedSectionType,
    FlashSaleProduct, HeadlineMessage, NewArrivalSection, PromotionalBanner, SaleBanner,
};
use crate::shared::validation::{
    validate_date_window, validate_non_negative_amount, validate_not_blank, HEX_COLOR_REGEX,
};

fn default_true() -> bool {
    true
}

fn default_max_products() -> i32 {
    8
}

fn default_days_window() -> i32 {
    30
}

/// Home-page content section addressed in `/api/home-settings/{section}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum HomeSection {
    Carousel,
    Promotional,
    Featured,
    Headline,
    Sale,
    FlashSale,
    NewArrival,
}

/// A stored row of any home-page section
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum HomeContent {
    Carousel(CarouselBanner),
    Promotional(PromotionalBanner),
    Featured(FeaturedSection),
    Headline(HeadlineMessage),
    Sale(SaleBanner),
    FlashSale(FlashSaleProduct),
    NewArrival(NewArrivalSection),
}

/// Create/replace form for one home-page section
#[derive(Debug, Clone)]
pub enum HomeContentForm {
    Carousel(CarouselBannerForm),
    Promotional(PromotionalBannerForm),
    Featured(FeaturedSectionForm),
    Headline(HeadlineMessageForm),
    Sale(SaleBannerForm),
    FlashSale(FlashSaleProductForm),
    NewArrival(NewArrivalSectionForm),
}

impl HomeContentForm {
    /// Decode and validate a request body for the given section
    pub fn parse(section: HomeSection, body: serde_json::Value) -> Result<Self> {
        Ok(match section {
            HomeSection::Carousel => Self::Carousel(decode(body)?),
            HomeSection::Promotional => Self::Promotional(decode(body)?),
            HomeSection::Featured => Self::Featured(decode(body)?),
            HomeSection::Headline => Self::Headline(decode(body)?),
            HomeSection::Sale => Self::Sale(decode(body)?),
            HomeSection::FlashSale => Self::FlashSale(decode(body)?),
            HomeSection::NewArrival => Self::NewArrival(decode(body)?),
        })
    }
}

fn decode<T: DeserializeOwned + Validate>(body: serde_json::Value) -> Result<T> {
    let form: T = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON data: {}", e)))?;
    form.validate()?;
    Ok(form)
}

macro_rules! window_check {
    ($name:ident, $form:ty) => {
        fn $name(form: &$form) -> std::result::Result<(), ValidationError> {
            validate_date_window(form.starts_at, form.ends_at)
        }
    };
}

window_check!(validate_carousel_window, CarouselBannerForm);
window_check!(validate_promotional_window, PromotionalBannerForm);
window_check!(validate_headline_window, HeadlineMessageForm);
window_check!(validate_sale_window, SaleBannerForm);

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_carousel_window"))]
pub struct CarouselBannerForm {
    #[validate(
        length(min = 1, max = 200, message = "title is required"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = 300))]
    pub subtitle: Option<String>,

    pub description: Option<String>,

    #[validate(
        length(min = 1, message = "image_url is required"),
        custom(function = "validate_not_blank")
    )]
    pub image_url: String,

    pub mobile_image_url: Option<String>,

    #[validate(length(max = 60))]
    pub button_text: Option<String>,

    pub button_link: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "background_color must be #RGB or #RRGGBB"))]
    pub background_color: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "text_color must be #RGB or #RRGGBB"))]
    pub text_color: Option<String>,

    #[serde(default)]
    pub text_position: CarouselTextPosition,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_promotional_window"))]
pub struct PromotionalBannerForm {
    #[validate(
        length(min = 1, max = 200, message = "title is required"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = 300))]
    pub subtitle: Option<String>,

    #[validate(
        length(min = 1, message = "image_url is required"),
        custom(function = "validate_not_blank")
    )]
    pub image_url: String,

    pub link_url: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "background_color must be #RGB or #RRGGBB"))]
    pub background_color: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "text_color must be #RGB or #RRGGBB"))]
    pub text_color: Option<String>,

    #[serde(default)]
    pub position: BannerPosition,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_featured_source"))]
pub struct FeaturedSectionForm {
    #[validate(
        length(min = 1, max = 200, message = "title is required"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = 300))]
    pub subtitle: Option<String>,

    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,

    #[serde(default)]
    pub section_type: FeaturedSectionType,

    /// Required when `section_type` is `category`
    pub category_id: Option<Uuid>,

    #[serde(default = "default_max_products")]
    #[validate(range(min = 1, max = 48, message = "max_products must be between 1 and 48"))]
    pub max_products: i32,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "background_color must be #RGB or #RRGGBB"))]
    pub background_color: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,
}

fn validate_featured_source(form: &FeaturedSectionForm) -> std::result::Result<(), ValidationError> {
    if form.section_type == FeaturedSectionType::Category && form.category_id.is_none() {
        let mut err = ValidationError::new("category_id");
        err.message = Some("category_id is required for category sections".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_headline_window"))]
pub struct HeadlineMessageForm {
    #[validate(
        length(min = 1, max = 300, message = "message is required"),
        custom(function = "validate_not_blank")
    )]
    pub message: String,

    pub link_url: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "background_color must be #RGB or #RRGGBB"))]
    pub background_color: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "text_color must be #RGB or #RRGGBB"))]
    pub text_color: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_sale_window"))]
pub struct SaleBannerForm {
    #[validate(
        length(min = 1, max = 200, message = "title is required"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = 300))]
    pub subtitle: Option<String>,

    /// Free text such as "Up to 50% off"
    #[validate(length(max = 100))]
    pub discount_text: Option<String>,

    pub image_url: Option<String>,

    #[validate(length(max = 60))]
    pub button_text: Option<String>,

    pub button_link: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "background_color must be #RGB or #RRGGBB"))]
    pub background_color: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "text_color must be #RGB or #RRGGBB"))]
    pub text_color: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Flash-sale entry. The flash price is checked against the product's
/// regular price when the entry is saved.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_flash_window"))]
pub struct FlashSaleProductForm {
    pub product_id: Uuid,

    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = String, example = "19.99")]
    pub flash_price: Decimal,

    #[validate(range(min = 1, message = "stock_limit must be at least 1"))]
    pub stock_limit: Option<i32>,

    #[serde(default)]
    #[validate(range(min = 0, message = "sold_count must not be negative"))]
    pub sold_count: i32,

    pub starts_at: Option<DateTime<Utc>>,

    /// Countdown target shown on the storefront
    pub ends_at: DateTime<Utc>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,
}

fn validate_flash_window(form: &FlashSaleProductForm) -> std::result::Result<(), ValidationError> {
    validate_date_window(form.starts_at, Some(form.ends_at))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewArrivalSectionForm {
    #[validate(
        length(min = 1, max = 200, message = "title is required"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = 300))]
    pub subtitle: Option<String>,

    #[serde(default = "default_max_products")]
    #[validate(range(min = 1, max = 48, message = "product_limit must be between 1 and 48"))]
    pub product_limit: i32,

    #[serde(default = "default_days_window")]
    #[validate(range(min = 1, max = 365, message = "days_window must be between 1 and 365"))]
    pub days_window: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i32,
}

/// Replacement values for the home-page settings row
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct HomePageSettingsForm {
    #[serde(default = "default_true")]
    pub show_headline: bool,
    #[serde(default = "default_true")]
    pub show_carousel: bool,
    #[serde(default = "default_true")]
    pub show_flash_sale: bool,
    #[serde(default = "default_true")]
    pub show_featured: bool,
    #[serde(default = "default_true")]
    pub show_new_arrivals: bool,
    #[serde(default = "default_true")]
    pub show_promotional: bool,
    #[serde(default = "default_true")]
    pub show_sale_banner: bool,

    #[validate(length(max = 100))]
    pub flash_sale_title: Option<String>,

    #[validate(length(max = 70))]
    pub meta_title: Option<String>,

    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors_of(result: Result<HomeContentForm>) -> Vec<String> {
        match result {
            Err(AppError::ValidationFields(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_section_path_names() {
        let section: HomeSection = serde_json::from_value(json!("flash-sale")).unwrap();
        assert_eq!(section, HomeSection::FlashSale);
        let section: HomeSection = serde_json::from_value(json!("new-arrival")).unwrap();
        assert_eq!(section, HomeSection::NewArrival);
        assert!(serde_json::from_value::<HomeSection>(json!("page")).is_err());
    }

    #[test]
    fn test_carousel_form_defaults() {
        let form = HomeContentForm::parse(
            HomeSection::Carousel,
            json!({ "title": "Summer drop", "image_url": "https://cdn.example.com/a.jpg" }),
        )
        .unwrap();

        match form {
            HomeContentForm::Carousel(f) => {
                assert!(f.is_active);
                assert_eq!(f.sort_order, 0);
                assert_eq!(f.text_position, CarouselTextPosition::Left);
            }
            other => panic!("unexpected form: {:?}", other),
        }
    }

    #[test]
    fn test_required_fields_and_colors() {
        let errors = errors_of(HomeContentForm::parse(
            HomeSection::Promotional,
            json!({ "title": " ", "image_url": "", "text_color": "red" }),
        ));

        assert!(errors.iter().any(|e| e.starts_with("title:")));
        assert!(errors.iter().any(|e| e == "image_url: image_url is required"));
        assert!(errors
            .iter()
            .any(|e| e == "text_color: text_color must be #RGB or #RRGGBB"));
    }

    #[test]
    fn test_whitespace_image_url_is_rejected() {
        for section in [HomeSection::Carousel, HomeSection::Promotional] {
            let errors = errors_of(HomeContentForm::parse(
                section,
                json!({ "title": "Summer", "image_url": "   " }),
            ));
            assert_eq!(errors, vec!["image_url: must not be blank"]);
        }
    }

    #[test]
    fn test_window_must_be_ordered() {
        let errors = errors_of(HomeContentForm::parse(
            HomeSection::Headline,
            json!({
                "message": "Free shipping this week",
                "starts_at": "2026-06-10T00:00:00Z",
                "ends_at": "2026-06-01T00:00:00Z"
            }),
        ));

        assert_eq!(errors, vec!["body: ends_at must be after starts_at"]);
    }

    #[test]
    fn test_flash_sale_requires_end() {
        let result = HomeContentForm::parse(
            HomeSection::FlashSale,
            json!({ "product_id": Uuid::new_v4(), "flash_price": "9.99" }),
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_category_section_needs_category() {
        let errors = errors_of(HomeContentForm::parse(
            HomeSection::Featured,
            json!({ "title": "Knitwear", "section_type": "category" }),
        ));
        assert_eq!(
            errors,
            vec!["body: category_id is required for category sections"]
        );
    }
}
