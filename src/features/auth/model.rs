use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::{ROLE_ADMIN, ROLE_CUSTOMER};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// User id (token subject)
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Check if user can manage the back office
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Check if user is a storefront customer
    #[allow(dead_code)]
    pub fn is_customer(&self) -> bool {
        self.has_role(ROLE_CUSTOMER)
    }
}

/// Claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub iss: Option<String>,
}

fn default_role() -> String {
    ROLE_CUSTOMER.to_string()
}
