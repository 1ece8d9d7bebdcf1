use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::map_write_error;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    creates_cycle, subtree_ids, CategoryFormDto, CategoryResponseDto, CategoryTreeDto,
    ParentOptionDto,
};
use crate::features::categories::models::Category;
use crate::shared::slug::{resolve_slug, sync_slug};

const CATEGORY_COLUMNS: &str = "id, parent_id, name, slug, description, image_url, display_order, is_active, created_at, updated_at";

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, active_only: bool) -> Result<Vec<Category>> {
        let query = format!(
            "SELECT {} FROM categories {} ORDER BY display_order, name",
            CATEGORY_COLUMNS,
            if active_only { "WHERE is_active = TRUE" } else { "" }
        );

        sqlx::query_as::<_, Category>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Category> {
        let query = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);

        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// List all active categories (flat list)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.fetch_all(true).await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// List all active categories as tree structure
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.fetch_all(true).await?;
        Ok(CategoryTreeDto::build_tree(categories))
    }

    /// List every category, including inactive ones (admin)
    pub async fn list_all(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.fetch_all(false).await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let query = format!(
            "SELECT {} FROM categories WHERE slug = $1 AND is_active = TRUE",
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category by slug: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CategoryResponseDto> {
        Ok(self.find_by_id(id).await?.into())
    }

    /// Categories that may become the parent of `id` (everything outside its subtree)
    pub async fn parent_options(&self, id: Uuid) -> Result<Vec<ParentOptionDto>> {
        let categories = self.fetch_all(false).await?;
        if !categories.iter().any(|c| c.id == id) {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        let parents: HashMap<Uuid, Option<Uuid>> =
            categories.iter().map(|c| (c.id, c.parent_id)).collect();
        let excluded = subtree_ids(id, &parents);

        Ok(categories
            .into_iter()
            .filter(|c| !excluded.contains(&c.id))
            .map(|c| ParentOptionDto {
                id: c.id,
                name: c.name,
                slug: c.slug,
            })
            .collect())
    }

    pub async fn create(&self, dto: CategoryFormDto) -> Result<CategoryResponseDto> {
        let slug = resolve_slug(&dto.name, dto.slug.as_deref())?;

        if let Some(parent_id) = dto.parent_id {
            self.find_by_id(parent_id).await.map_err(|_| {
                AppError::BadRequest(format!("Parent category {} does not exist", parent_id))
            })?;
        }

        let query = format!(
            r#"
            INSERT INTO categories (parent_id, name, slug, description, image_url, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(dto.parent_id)
            .bind(dto.name.trim())
            .bind(&slug)
            .bind(&dto.description)
            .bind(&dto.image_url)
            .bind(dto.display_order)
            .bind(dto.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error("Category", e))?;

        tracing::info!("Category created: id={}, slug={}", category.id, category.slug);

        Ok(category.into())
    }

    pub async fn update(&self, id: Uuid, dto: CategoryFormDto) -> Result<CategoryResponseDto> {
        let existing = self.find_by_id(id).await?;
        let slug = sync_slug(
            &existing.name,
            &existing.slug,
            Some(&dto.name),
            dto.slug.as_deref(),
        )?;

        if let Some(parent_id) = dto.parent_id {
            let categories = self.fetch_all(false).await?;
            let parents: HashMap<Uuid, Option<Uuid>> =
                categories.iter().map(|c| (c.id, c.parent_id)).collect();

            if !parents.contains_key(&parent_id) {
                return Err(AppError::BadRequest(format!(
                    "Parent category {} does not exist",
                    parent_id
                )));
            }
            if creates_cycle(id, parent_id, &parents) {
                return Err(AppError::Validation(
                    "A category cannot be moved under itself or one of its descendants"
                        .to_string(),
                ));
            }
        }

        let query = format!(
            r#"
            UPDATE categories
            SET parent_id = $2,
                name = $3,
                slug = $4,
                description = $5,
                image_url = $6,
                display_order = $7,
                is_active = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(dto.parent_id)
            .bind(dto.name.trim())
            .bind(&slug)
            .bind(&dto.description)
            .bind(&dto.image_url)
            .bind(dto.display_order)
            .bind(dto.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error("Category", e))?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!("Category updated: id={}, slug={}", category.id, category.slug);

        Ok(category.into())
    }

    /// Delete a category. Children become roots and products lose the category.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("Category", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }
}
