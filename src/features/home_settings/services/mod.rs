mod home_settings_service;

pub use home_settings_service::{check_flash_price, HomeSettingsService, SectionForm};
