mod home_settings_handler;

pub use home_settings_handler::*;
