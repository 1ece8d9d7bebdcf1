mod home_service;

pub use home_service::{is_active_now, HomeService};
