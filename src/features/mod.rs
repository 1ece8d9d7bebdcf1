pub mod auth;
pub mod cart;
pub mod categories;
pub mod files;
pub mod home;
pub mod home_settings;
pub mod orders;
pub mod products;
pub mod users;
