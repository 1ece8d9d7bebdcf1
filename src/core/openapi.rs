use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::cart::{dtos as cart_dtos, handlers as cart_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::home::{dtos as home_dtos, handlers as home_handlers};
use crate::features::home_settings::{
    dtos as home_settings_dtos, handlers as home_settings_handlers,
    models as home_settings_models,
};
use crate::features::orders::{
    dtos as orders_dtos, handlers as orders_handlers, models as orders_models,
};
use crate::features::products::{
    dtos as products_dtos, handlers as products_handlers, models as products_models,
};
use crate::features::users::{dtos as users_dtos, handlers::profile_handler};
use crate::shared::pricing::PriceDisplay;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        profile_handler::get_profile,
        profile_handler::update_profile,
        // Home (public)
        home_handlers::get_home_page,
        // Categories (public)
        categories_handlers::list_categories,
        categories_handlers::get_category,
        // Categories (admin)
        categories_handlers::admin_list_categories,
        categories_handlers::admin_get_category,
        categories_handlers::admin_parent_options,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Products (public)
        products_handlers::list_products,
        products_handlers::get_product,
        // Products (admin)
        products_handlers::admin_list_products,
        products_handlers::admin_get_product,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        // Cart
        cart_handlers::get_cart,
        cart_handlers::add_cart_item,
        cart_handlers::update_cart_item,
        cart_handlers::remove_cart_item,
        cart_handlers::clear_cart,
        // Orders
        orders_handlers::create_order,
        orders_handlers::list_my_orders,
        orders_handlers::get_my_order,
        // Orders (admin)
        orders_handlers::admin_list_orders,
        orders_handlers::admin_get_order,
        orders_handlers::update_order_status,
        orders_handlers::update_order_address,
        orders_handlers::add_order_item,
        orders_handlers::remove_order_item,
        orders_handlers::delete_order,
        // Home settings (admin)
        home_settings_handlers::get_page_settings,
        home_settings_handlers::update_page_settings,
        home_settings_handlers::list_section,
        home_settings_handlers::get_section_item,
        home_settings_handlers::create_section_item,
        home_settings_handlers::update_section_item,
        home_settings_handlers::delete_section_item,
        // Files (admin)
        files_handlers::upload_file,
        files_handlers::delete_file_by_url,
    ),
    components(
        schemas(
            // Common
            Meta,
            DeletedDto,
            PriceDisplay,
            ApiResponse<DeletedDto>,
            // Users
            users_dtos::UserProfileResponseDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::UserProfileResponseDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryFormDto,
            categories_dtos::ParentOptionDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::ParentOptionDto>>,
            // Products
            products_models::ProductStatus,
            products_models::StockStatus,
            products_dtos::ProductSort,
            products_dtos::ProductCategoryDto,
            products_dtos::ProductSummaryDto,
            products_dtos::ProductImageDto,
            products_dtos::ProductColorDto,
            products_dtos::ProductSizeDto,
            products_dtos::ProductAttributeDto,
            products_dtos::ProductDetailDto,
            products_dtos::ProductImageInput,
            products_dtos::ProductColorInput,
            products_dtos::ProductSizeInput,
            products_dtos::ProductAttributeInput,
            products_dtos::ProductFormDto,
            ApiResponse<Vec<products_dtos::ProductSummaryDto>>,
            ApiResponse<products_dtos::ProductDetailDto>,
            // Cart
            cart_dtos::AddCartItemDto,
            cart_dtos::UpdateCartItemDto,
            cart_dtos::CartLineDto,
            cart_dtos::CartDto,
            ApiResponse<cart_dtos::CartDto>,
            // Orders
            orders_models::OrderStatus,
            orders_models::PaymentStatus,
            orders_dtos::ShippingAddressDto,
            orders_dtos::CheckoutDto,
            orders_dtos::UpdateOrderStatusDto,
            orders_dtos::AddOrderItemDto,
            orders_dtos::ShippingAddressResponseDto,
            orders_dtos::OrderItemDto,
            orders_dtos::OrderDetailDto,
            orders_dtos::OrderSummaryDto,
            ApiResponse<orders_dtos::OrderDetailDto>,
            ApiResponse<Vec<orders_dtos::OrderSummaryDto>>,
            // Home page
            home_dtos::PromotionalSlotsDto,
            home_dtos::FeaturedSectionDto,
            home_dtos::FlashSaleCardDto,
            home_dtos::FlashSaleBlockDto,
            home_dtos::NewArrivalsDto,
            home_dtos::HomePageDto,
            ApiResponse<home_dtos::HomePageDto>,
            // Home settings
            home_settings_models::CarouselTextPosition,
            home_settings_models::BannerPosition,
            home_settings_models::FeaturedSectionType,
            home_settings_models::CarouselBanner,
            home_settings_models::PromotionalBanner,
            home_settings_models::FeaturedSection,
            home_settings_models::HeadlineMessage,
            home_settings_models::SaleBanner,
            home_settings_models::FlashSaleProduct,
            home_settings_models::NewArrivalSection,
            home_settings_models::HomePageSettings,
            home_settings_dtos::HomeSection,
            home_settings_dtos::HomeContent,
            home_settings_dtos::CarouselBannerForm,
            home_settings_dtos::PromotionalBannerForm,
            home_settings_dtos::FeaturedSectionForm,
            home_settings_dtos::HeadlineMessageForm,
            home_settings_dtos::SaleBannerForm,
            home_settings_dtos::FlashSaleProductForm,
            home_settings_dtos::NewArrivalSectionForm,
            home_settings_dtos::HomePageSettingsForm,
            ApiResponse<home_settings_dtos::HomeContent>,
            ApiResponse<Vec<home_settings_dtos::HomeContent>>,
            ApiResponse<home_settings_models::HomePageSettings>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::DeleteFileByUrlDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
        )
    ),
    tags(
        (name = "users", description = "Customer profile"),
        (name = "home", description = "Storefront home page (public)"),
        (name = "categories", description = "Catalog categories"),
        (name = "products", description = "Catalog products"),
        (name = "cart", description = "Shopping cart of the signed-in customer"),
        (name = "orders", description = "Checkout and order history"),
        (name = "admin-orders", description = "Order management (admin only)"),
        (name = "home-settings", description = "Home page content management (admin only)"),
        (name = "files", description = "Media uploads (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "API documentation for the storefront and back office",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_storefront_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/home",
            "/api/products",
            "/api/cart",
            "/api/orders",
            "/api/admin/orders/{id}/status",
            "/api/home-settings/{section}",
            "/api/upload",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
