mod cart_service;

pub(crate) use cart_service::CART_LINE_SELECT;
pub use cart_service::{match_option, CartService};
