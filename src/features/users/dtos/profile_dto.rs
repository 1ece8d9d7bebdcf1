use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::User;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponseDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Role taken from the access token
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileResponseDto {
    pub fn new(user: User, role: String) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request DTO for updating the profile. Empty strings clear a field.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(max = 128, message = "Name must not exceed 128 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 30, message = "Phone must not exceed 30 characters"))]
    pub phone: Option<String>,
}

impl UpdateProfileDto {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::faker::phone_number::en::PhoneNumber;
    use fake::Fake;

    #[test]
    fn test_update_profile_trims_values() {
        let name: String = Name().fake();
        let dto = UpdateProfileDto {
            name: Some(format!("  {}  ", name)),
            phone: Some("   ".to_string()),
        };

        assert_eq!(dto.name(), Some(name.as_str()));
        assert_eq!(dto.phone(), None);
    }

    #[test]
    fn test_update_profile_limits() {
        let dto = UpdateProfileDto {
            name: Some("x".repeat(129)),
            phone: Some(PhoneNumber().fake()),
        };

        assert!(dto.validate().is_err());
    }
}
