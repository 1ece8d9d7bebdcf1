/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page number served; larger requests read the last allowed page
pub const MAX_PAGE: i64 = 10_000;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Back-office role - manages catalog, orders and home-page content
pub const ROLE_ADMIN: &str = "admin";

/// Storefront customer - browses, fills a cart and places orders
pub const ROLE_CUSTOMER: &str = "customer";

// =============================================================================
// ORDERS
// =============================================================================

/// Prefix of human-readable order numbers (e.g. ORD-2026-0000042)
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Maximum quantity of a single line in a cart or order
pub const MAX_LINE_QUANTITY: i32 = 999;
