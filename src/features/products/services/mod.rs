mod product_service;

pub(crate) use product_service::PRODUCT_COLUMNS;
pub use product_service::ProductService;
