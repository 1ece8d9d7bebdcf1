use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::products::models::{
    Product, ProductAttribute, ProductColor, ProductImage, ProductListRow, ProductSize,
    ProductStatus, StockStatus,
};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};
use crate::shared::pricing::PriceDisplay;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::{
    validate_non_negative_amount, validate_not_blank, validate_positive_amount, HEX_COLOR_REGEX,
};

// Sort order for product listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

// Query params for listing products
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct ProductQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Category slug; products of its subcategories are included
    pub category: Option<String>,

    /// Search in name, SKU and short description
    pub search: Option<String>,

    pub featured: Option<bool>,

    /// Only products with an effective sale price
    pub on_sale: Option<bool>,

    /// Lower bound on the effective price
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,

    /// Upper bound on the effective price
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,

    /// Publication status (back office only; storefront always lists ACTIVE)
    pub status: Option<ProductStatus>,

    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.clamp(1, MAX_PAGE),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Category reference embedded in product payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ProductCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Product card used by listings, the home page and featured sections
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub short_description: Option<String>,
    #[serde(flatten)]
    pub price: PriceDisplay,
    pub stock_status: StockStatus,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub primary_image_url: Option<String>,
    pub category: Option<ProductCategoryDto>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductListRow> for ProductSummaryDto {
    fn from(row: ProductListRow) -> Self {
        let p = row.product;
        let category = match (p.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(ProductCategoryDto { id, name, slug }),
            _ => None,
        };

        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            sku: p.sku,
            short_description: p.short_description,
            price: PriceDisplay::new(p.regular_price, p.sale_price),
            stock_status: p.stock_status,
            status: p.status,
            is_featured: p.is_featured,
            primary_image_url: row.primary_image_url,
            category,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImageDto {
    pub id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
}

impl From<ProductImage> for ProductImageDto {
    fn from(i: ProductImage) -> Self {
        Self {
            id: i.id,
            url: i.url,
            alt_text: i.alt_text,
            sort_order: i.sort_order,
            is_primary: i.is_primary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductColorDto {
    pub id: Uuid,
    pub name: String,
    pub hex_code: Option<String>,
}

impl From<ProductColor> for ProductColorDto {
    fn from(c: ProductColor) -> Self {
        Self {
            id: c.id,
            name: c.name,
            hex_code: c.hex_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSizeDto {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
}

impl From<ProductSize> for ProductSizeDto {
    fn from(s: ProductSize) -> Self {
        Self {
            id: s.id,
            name: s.name,
            sort_order: s.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductAttributeDto {
    pub id: Uuid,
    pub name: String,
    pub value: String,
}

impl From<ProductAttribute> for ProductAttributeDto {
    fn from(a: ProductAttribute) -> Self {
        Self {
            id: a.id,
            name: a.name,
            value: a.value,
        }
    }
}

/// Full product payload for the detail page and the back-office editor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetailDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    #[serde(flatten)]
    pub price: PriceDisplay,
    pub stock_status: StockStatus,
    pub stock_quantity: i32,
    pub manage_stock: bool,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub category: Option<ProductCategoryDto>,
    pub images: Vec<ProductImageDto>,
    pub colors: Vec<ProductColorDto>,
    pub sizes: Vec<ProductSizeDto>,
    pub attributes: Vec<ProductAttributeDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Child rows loaded alongside a product
#[derive(Debug, Default)]
pub struct ProductChildren {
    pub images: Vec<ProductImage>,
    pub colors: Vec<ProductColor>,
    pub sizes: Vec<ProductSize>,
    pub attributes: Vec<ProductAttribute>,
}

impl ProductDetailDto {
    pub fn from_parts(
        product: Product,
        category: Option<ProductCategoryDto>,
        children: ProductChildren,
    ) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            sku: product.sku,
            description: product.description,
            short_description: product.short_description,
            price: PriceDisplay::new(product.regular_price, product.sale_price),
            stock_status: product.stock_status,
            stock_quantity: product.stock_quantity,
            manage_stock: product.manage_stock,
            status: product.status,
            is_featured: product.is_featured,
            category,
            images: children.images.into_iter().map(Into::into).collect(),
            colors: children.colors.into_iter().map(Into::into).collect(),
            sizes: children.sizes.into_iter().map(Into::into).collect(),
            attributes: children.attributes.into_iter().map(Into::into).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductImageInput {
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,

    #[validate(length(max = 255))]
    pub alt_text: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductColorInput {
    #[validate(length(min = 1, max = 60), custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "hex_code must be #RGB or #RRGGBB"))]
    pub hex_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductSizeInput {
    #[validate(length(min = 1, max = 30), custom(function = "validate_not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductAttributeInput {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(min = 1, max = 500), custom(function = "validate_not_blank"))]
    pub value: String,
}

/// Admin form for creating or replacing a product.
///
/// Child collections (images, colors, sizes, attributes) replace the stored
/// ones as a whole.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_sale_below_regular"))]
pub struct ProductFormDto {
    #[validate(
        length(min = 1, max = 200, message = "name is required"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    /// Leave empty to generate from the name
    #[validate(length(max = 220))]
    pub slug: Option<String>,

    #[validate(length(max = 64))]
    pub sku: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 500))]
    pub short_description: Option<String>,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(value_type = String, example = "49.99")]
    pub regular_price: Decimal,

    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = Option<String>, example = "39.99")]
    pub sale_price: Option<Decimal>,

    /// Ignored when `manage_stock` is true; the status then follows the quantity
    #[serde(default)]
    pub stock_status: StockStatus,

    #[serde(default)]
    #[validate(range(min = 0, message = "stock_quantity must not be negative"))]
    pub stock_quantity: i32,

    #[serde(default)]
    pub manage_stock: bool,

    pub category_id: Option<Uuid>,

    #[serde(default)]
    pub status: ProductStatus,

    #[serde(default)]
    pub is_featured: bool,

    #[serde(default)]
    #[validate(length(max = 20), nested)]
    pub images: Vec<ProductImageInput>,

    #[serde(default)]
    #[validate(nested)]
    pub colors: Vec<ProductColorInput>,

    #[serde(default)]
    #[validate(nested)]
    pub sizes: Vec<ProductSizeInput>,

    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<ProductAttributeInput>,
}

fn validate_sale_below_regular(form: &ProductFormDto) -> Result<(), ValidationError> {
    match form.sale_price {
        Some(sale) if sale >= form.regular_price => {
            let mut err = ValidationError::new("sale_price");
            err.message = Some("sale_price must be lower than regular_price".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl ProductFormDto {
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Images in display order with exactly one primary image
    pub fn normalized_images(&self) -> Vec<ProductImageInput> {
        let mut images = self.images.clone();
        images.sort_by_key(|i| i.sort_order);

        let primary = images.iter().position(|i| i.is_primary).unwrap_or(0);
        for (index, image) in images.iter_mut().enumerate() {
            image.is_primary = index == primary;
        }
        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> ProductFormDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_form_defaults() {
        let f = form(json!({ "name": "Linen Shirt", "regular_price": "49.99" }));
        assert!(f.validate().is_ok());
        assert_eq!(f.status, ProductStatus::Draft);
        assert_eq!(f.stock_status, StockStatus::InStock);
        assert!(f.images.is_empty());
    }

    #[test]
    fn test_form_rejects_bad_prices() {
        let f = form(json!({ "name": "Linen Shirt", "regular_price": "0" }));
        assert!(f.validate().is_err());

        let f = form(json!({
            "name": "Linen Shirt",
            "regular_price": "49.99",
            "sale_price": "49.99"
        }));
        assert!(f.validate().is_err());

        let f = form(json!({
            "name": "Linen Shirt",
            "regular_price": "49.99",
            "sale_price": "-1"
        }));
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_form_validates_children() {
        let f = form(json!({
            "name": "Linen Shirt",
            "regular_price": "49.99",
            "colors": [{ "name": "Sand", "hex_code": "sand" }]
        }));
        let err = f.validate().unwrap_err();
        assert!(err.errors().contains_key("colors"));
    }

    #[test]
    fn test_normalized_images_has_single_primary() {
        let f = form(json!({
            "name": "Linen Shirt",
            "regular_price": "49.99",
            "images": [
                { "url": "https://cdn.example.com/b.jpg", "sort_order": 2, "is_primary": true },
                { "url": "https://cdn.example.com/a.jpg", "sort_order": 1, "is_primary": true },
                { "url": "https://cdn.example.com/c.jpg", "sort_order": 3 }
            ]
        }));

        let images = f.normalized_images();
        assert_eq!(images[0].url, "https://cdn.example.com/a.jpg");
        assert_eq!(images.iter().filter(|i| i.is_primary).count(), 1);
        assert!(images[0].is_primary);
    }

    #[test]
    fn test_normalized_images_promotes_first_when_none_primary() {
        let f = form(json!({
            "name": "Linen Shirt",
            "regular_price": "49.99",
            "images": [
                { "url": "https://cdn.example.com/a.jpg" },
                { "url": "https://cdn.example.com/b.jpg" }
            ]
        }));

        let images = f.normalized_images();
        assert!(images[0].is_primary);
        assert!(!images[1].is_primary);
    }

    #[test]
    fn test_blank_sku_is_treated_as_missing() {
        let f = form(json!({ "name": "Tee", "regular_price": "10", "sku": "  " }));
        assert_eq!(f.sku(), None);
    }
}
