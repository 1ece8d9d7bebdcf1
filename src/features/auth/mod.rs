//! Bearer token authentication.
//!
//! Tokens are issued by the identity service; this feature only validates
//! them and exposes the caller as an [`model::AuthenticatedUser`].

mod validator;

pub mod guards;
pub mod model;

pub use validator::JwtValidator;
