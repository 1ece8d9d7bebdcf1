//! Customer profile stored alongside orders.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/auth/profile` | Get the caller's profile (created on first access) |
//! | PUT | `/api/auth/profile` | Update name and phone |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserProfileService;
