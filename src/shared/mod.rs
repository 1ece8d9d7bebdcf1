pub mod constants;
pub mod pricing;
pub mod slug;
pub mod test_helpers;
pub mod types;
pub mod validation;
