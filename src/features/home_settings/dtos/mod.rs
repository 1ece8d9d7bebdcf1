mod home_settings_dto;

pub use home_settings_dto::*;
