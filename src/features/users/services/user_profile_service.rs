use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{UpdateProfileDto, UserProfileResponseDto};
use crate::features::users::models::User;

const USER_COLUMNS: &str = "id, email, name, phone, created_at, updated_at";

/// Service for the caller's own profile
pub struct UserProfileService {
    pool: PgPool,
}

impl UserProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the caller's profile, creating the row on first access.
    ///
    /// The email is refreshed from the token when it carries one.
    pub async fn get_profile(&self, user: &AuthenticatedUser) -> Result<UserProfileResponseDto> {
        let query = format!(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(user.email.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load profile for {}: {:?}", user.id, e);
                AppError::Database(e)
            })?;

        Ok(UserProfileResponseDto::new(row, user.role.clone()))
    }

    pub async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<UserProfileResponseDto> {
        let query = format!(
            r#"
            INSERT INTO users (id, email, name, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email),
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(user.email.as_deref())
            .bind(dto.name())
            .bind(dto.phone())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile for {}: {:?}", user.id, e);
                AppError::Database(e)
            })?;

        tracing::info!("Profile updated: user_id={}", user.id);
        Ok(UserProfileResponseDto::new(row, user.role.clone()))
    }
}
