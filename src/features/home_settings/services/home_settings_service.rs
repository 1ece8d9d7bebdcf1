use rust_decimal::Decimal;
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::database::map_write_error;
use crate::core::error::{AppError, Result};
use crate::features::home_settings::dtos::{
    CarouselBannerForm, FeaturedSectionForm, FlashSaleProductForm, HeadlineMessageForm,
    HomeContent, HomeContentForm, HomePageSettingsForm, HomeSection, NewArrivalSectionForm,
    PromotionalBannerForm, SaleBannerForm,
};
use crate::features::home_settings::models::{
    CarouselBanner, ContentSection, FeaturedSection, FlashSaleProduct, HeadlineMessage,
    HomePageSettings, NewArrivalSection, PromotionalBanner, SaleBanner,
    HOME_PAGE_SETTINGS_COLUMNS,
};

/// Maps a back-office form onto the columns of its section table
pub trait SectionForm {
    type Row: ContentSection;

    /// Columns written by the form, in `push_values` order
    const FIELDS: &'static str;

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>);
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl SectionForm for CarouselBannerForm {
    type Row = CarouselBanner;
    const FIELDS: &'static str = "title, subtitle, description, image_url, mobile_image_url, button_text, button_link, background_color, text_color, text_position, is_active, sort_order, starts_at, ends_at";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.title.trim().to_string())
            .push_bind(trimmed(&self.subtitle))
            .push_bind(trimmed(&self.description))
            .push_bind(self.image_url.trim().to_string())
            .push_bind(trimmed(&self.mobile_image_url))
            .push_bind(trimmed(&self.button_text))
            .push_bind(trimmed(&self.button_link))
            .push_bind(self.background_color.clone())
            .push_bind(self.text_color.clone())
            .push_bind(self.text_position)
            .push_bind(self.is_active)
            .push_bind(self.sort_order)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at);
    }
}

impl SectionForm for PromotionalBannerForm {
    type Row = PromotionalBanner;
    const FIELDS: &'static str = "title, subtitle, image_url, link_url, background_color, text_color, position, is_active, sort_order, starts_at, ends_at";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.title.trim().to_string())
            .push_bind(trimmed(&self.subtitle))
            .push_bind(self.image_url.trim().to_string())
            .push_bind(trimmed(&self.link_url))
            .push_bind(self.background_color.clone())
            .push_bind(self.text_color.clone())
            .push_bind(self.position)
            .push_bind(self.is_active)
            .push_bind(self.sort_order)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at);
    }
}

impl SectionForm for FeaturedSectionForm {
    type Row = FeaturedSection;
    const FIELDS: &'static str = "title, subtitle, description, image_url, link_url, section_type, category_id, max_products, background_color, is_active, sort_order";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.title.trim().to_string())
            .push_bind(trimmed(&self.subtitle))
            .push_bind(trimmed(&self.description))
            .push_bind(trimmed(&self.image_url))
            .push_bind(trimmed(&self.link_url))
            .push_bind(self.section_type)
            .push_bind(self.category_id)
            .push_bind(self.max_products)
            .push_bind(self.background_color.clone())
            .push_bind(self.is_active)
            .push_bind(self.sort_order);
    }
}

impl SectionForm for HeadlineMessageForm {
    type Row = HeadlineMessage;
    const FIELDS: &'static str = "message, link_url, background_color, text_color, is_active, sort_order, starts_at, ends_at";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.message.trim().to_string())
            .push_bind(trimmed(&self.link_url))
            .push_bind(self.background_color.clone())
            .push_bind(self.text_color.clone())
            .push_bind(self.is_active)
            .push_bind(self.sort_order)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at);
    }
}

impl SectionForm for SaleBannerForm {
    type Row = SaleBanner;
    const FIELDS: &'static str = "title, subtitle, discount_text, image_url, button_text, button_link, background_color, text_color, is_active, sort_order, starts_at, ends_at";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.title.trim().to_string())
            .push_bind(trimmed(&self.subtitle))
            .push_bind(trimmed(&self.discount_text))
            .push_bind(trimmed(&self.image_url))
            .push_bind(trimmed(&self.button_text))
            .push_bind(trimmed(&self.button_link))
            .push_bind(self.background_color.clone())
            .push_bind(self.text_color.clone())
            .push_bind(self.is_active)
            .push_bind(self.sort_order)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at);
    }
}

impl SectionForm for FlashSaleProductForm {
    type Row = FlashSaleProduct;
    const FIELDS: &'static str = "product_id, flash_price, stock_limit, sold_count, starts_at, ends_at, is_active, sort_order";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.product_id)
            .push_bind(self.flash_price.round_dp(2))
            .push_bind(self.stock_limit)
            .push_bind(self.sold_count)
            .push_bind(self.starts_at)
            .push_bind(self.ends_at)
            .push_bind(self.is_active)
            .push_bind(self.sort_order);
    }
}

impl SectionForm for NewArrivalSectionForm {
    type Row = NewArrivalSection;
    const FIELDS: &'static str = "title, subtitle, product_limit, days_window, is_active, sort_order";

    fn push_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.title.trim().to_string())
            .push_bind(trimmed(&self.subtitle))
            .push_bind(self.product_limit)
            .push_bind(self.days_window)
            .push_bind(self.is_active)
            .push_bind(self.sort_order);
    }
}

fn insert_query<F: SectionForm>(form: &F) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        F::Row::TABLE,
        F::FIELDS
    ));
    form.push_values(&mut query.separated(", "));
    query.push(format!(") RETURNING {}", F::Row::COLUMNS));
    query
}

fn update_query<F: SectionForm>(id: Uuid, form: &F) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "UPDATE {} SET ({}, updated_at) = ROW(",
        F::Row::TABLE,
        F::FIELDS
    ));
    form.push_values(&mut query.separated(", "));
    query.push(", NOW()) WHERE id = ").push_bind(id);
    query.push(format!(" RETURNING {}", F::Row::COLUMNS));
    query
}

/// A flash price only makes sense below what the product normally costs
pub fn check_flash_price(flash_price: Decimal, regular_price: Decimal) -> Result<()> {
    if flash_price >= regular_price {
        return Err(AppError::Validation(format!(
            "flash_price must be lower than the product's regular price ({})",
            regular_price
        )));
    }
    Ok(())
}

/// Service for back-office management of home-page content
pub struct HomeSettingsService {
    pool: PgPool,
}

impl HomeSettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows of one section ordered for display
    pub async fn rows<S: ContentSection>(&self, only_active: bool) -> Result<Vec<S>> {
        let filter = if only_active { "WHERE is_active = TRUE" } else { "" };
        let query = format!(
            "SELECT {} FROM {} {} ORDER BY sort_order, created_at",
            S::COLUMNS,
            S::TABLE,
            filter
        );

        sqlx::query_as::<_, S>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list {}: {:?}", S::TABLE, e);
                AppError::Database(e)
            })
    }

    async fn row<S: ContentSection>(&self, id: Uuid) -> Result<S> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", S::COLUMNS, S::TABLE);

        sqlx::query_as::<_, S>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get {} row: {:?}", S::TABLE, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", S::LABEL, id)))
    }

    async fn insert<F: SectionForm>(&self, form: &F) -> Result<F::Row> {
        let row = insert_query(form)
            .build_query_as::<F::Row>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(F::Row::LABEL, e))?;

        tracing::info!("{} created", F::Row::LABEL);
        Ok(row)
    }

    async fn replace<F: SectionForm>(&self, id: Uuid, form: &F) -> Result<F::Row> {
        let row = update_query(id, form)
            .build_query_as::<F::Row>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(F::Row::LABEL, e))?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", F::Row::LABEL, id)))?;

        tracing::info!("{} updated: id={}", F::Row::LABEL, id);
        Ok(row)
    }

    async fn remove<S: ContentSection>(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", S::TABLE))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {} row: {:?}", S::TABLE, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", S::LABEL, id)));
        }

        tracing::info!("{} deleted: id={}", S::LABEL, id);
        Ok(())
    }

    pub async fn list(&self, section: HomeSection) -> Result<Vec<HomeContent>> {
        Ok(match section {
            HomeSection::Carousel => wrap(self.rows(false).await?, HomeContent::Carousel),
            HomeSection::Promotional => wrap(self.rows(false).await?, HomeContent::Promotional),
            HomeSection::Featured => wrap(self.rows(false).await?, HomeContent::Featured),
            HomeSection::Headline => wrap(self.rows(false).await?, HomeContent::Headline),
            HomeSection::Sale => wrap(self.rows(false).await?, HomeContent::Sale),
            HomeSection::FlashSale => wrap(self.rows(false).await?, HomeContent::FlashSale),
            HomeSection::NewArrival => wrap(self.rows(false).await?, HomeContent::NewArrival),
        })
    }

    pub async fn get(&self, section: HomeSection, id: Uuid) -> Result<HomeContent> {
        Ok(match section {
            HomeSection::Carousel => HomeContent::Carousel(self.row(id).await?),
            HomeSection::Promotional => HomeContent::Promotional(self.row(id).await?),
            HomeSection::Featured => HomeContent::Featured(self.row(id).await?),
            HomeSection::Headline => HomeContent::Headline(self.row(id).await?),
            HomeSection::Sale => HomeContent::Sale(self.row(id).await?),
            HomeSection::FlashSale => HomeContent::FlashSale(self.row(id).await?),
            HomeSection::NewArrival => HomeContent::NewArrival(self.row(id).await?),
        })
    }

    pub async fn create(&self, form: HomeContentForm) -> Result<HomeContent> {
        Ok(match form {
            HomeContentForm::Carousel(f) => HomeContent::Carousel(self.insert(&f).await?),
            HomeContentForm::Promotional(f) => HomeContent::Promotional(self.insert(&f).await?),
            HomeContentForm::Featured(f) => {
                self.ensure_category(&f).await?;
                HomeContent::Featured(self.insert(&f).await?)
            }
            HomeContentForm::Headline(f) => HomeContent::Headline(self.insert(&f).await?),
            HomeContentForm::Sale(f) => HomeContent::Sale(self.insert(&f).await?),
            HomeContentForm::FlashSale(f) => {
                self.ensure_flash_price(&f).await?;
                HomeContent::FlashSale(self.insert(&f).await?)
            }
            HomeContentForm::NewArrival(f) => HomeContent::NewArrival(self.insert(&f).await?),
        })
    }

    pub async fn update(&self, id: Uuid, form: HomeContentForm) -> Result<HomeContent> {
        Ok(match form {
            HomeContentForm::Carousel(f) => HomeContent::Carousel(self.replace(id, &f).await?),
            HomeContentForm::Promotional(f) => {
                HomeContent::Promotional(self.replace(id, &f).await?)
            }
            HomeContentForm::Featured(f) => {
                self.ensure_category(&f).await?;
                HomeContent::Featured(self.replace(id, &f).await?)
            }
            HomeContentForm::Headline(f) => HomeContent::Headline(self.replace(id, &f).await?),
            HomeContentForm::Sale(f) => HomeContent::Sale(self.replace(id, &f).await?),
            HomeContentForm::FlashSale(f) => {
                self.ensure_flash_price(&f).await?;
                HomeContent::FlashSale(self.replace(id, &f).await?)
            }
            HomeContentForm::NewArrival(f) => {
                HomeContent::NewArrival(self.replace(id, &f).await?)
            }
        })
    }

    pub async fn delete(&self, section: HomeSection, id: Uuid) -> Result<()> {
        match section {
            HomeSection::Carousel => self.remove::<CarouselBanner>(id).await,
            HomeSection::Promotional => self.remove::<PromotionalBanner>(id).await,
            HomeSection::Featured => self.remove::<FeaturedSection>(id).await,
            HomeSection::Headline => self.remove::<HeadlineMessage>(id).await,
            HomeSection::Sale => self.remove::<SaleBanner>(id).await,
            HomeSection::FlashSale => self.remove::<FlashSaleProduct>(id).await,
            HomeSection::NewArrival => self.remove::<NewArrivalSection>(id).await,
        }
    }

    async fn ensure_flash_price(&self, form: &FlashSaleProductForm) -> Result<()> {
        let regular_price: Decimal =
            sqlx::query_scalar("SELECT regular_price FROM products WHERE id = $1")
                .bind(form.product_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Product {} not found", form.product_id))
                })?;

        check_flash_price(form.flash_price, regular_price)
    }

    async fn ensure_category(&self, form: &FeaturedSectionForm) -> Result<()> {
        let Some(category_id) = form.category_id else {
            return Ok(());
        };

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }
        Ok(())
    }

    pub async fn page_settings(&self) -> Result<HomePageSettings> {
        let query = format!(
            "SELECT {} FROM home_page_settings WHERE id = 1",
            HOME_PAGE_SETTINGS_COLUMNS
        );

        let settings = sqlx::query_as::<_, HomePageSettings>(&query)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load home page settings: {:?}", e);
                AppError::Database(e)
            })?;

        match settings {
            Some(settings) => Ok(settings),
            // Row is seeded by migration; recreate it with defaults if it went missing
            None => {
                let query = format!(
                    "INSERT INTO home_page_settings (id) VALUES (1) ON CONFLICT (id) DO UPDATE SET id = 1 RETURNING {}",
                    HOME_PAGE_SETTINGS_COLUMNS
                );
                sqlx::query_as::<_, HomePageSettings>(&query)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(AppError::Database)
            }
        }
    }

    pub async fn update_page_settings(
        &self,
        form: HomePageSettingsForm,
    ) -> Result<HomePageSettings> {
        let query = format!(
            r#"
            INSERT INTO home_page_settings (
                id, show_headline, show_carousel, show_flash_sale, show_featured,
                show_new_arrivals, show_promotional, show_sale_banner,
                flash_sale_title, meta_title, meta_description
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET show_headline = EXCLUDED.show_headline,
                show_carousel = EXCLUDED.show_carousel,
                show_flash_sale = EXCLUDED.show_flash_sale,
                show_featured = EXCLUDED.show_featured,
                show_new_arrivals = EXCLUDED.show_new_arrivals,
                show_promotional = EXCLUDED.show_promotional,
                show_sale_banner = EXCLUDED.show_sale_banner,
                flash_sale_title = EXCLUDED.flash_sale_title,
                meta_title = EXCLUDED.meta_title,
                meta_description = EXCLUDED.meta_description,
                updated_at = NOW()
            RETURNING {}
            "#,
            HOME_PAGE_SETTINGS_COLUMNS
        );

        let settings = sqlx::query_as::<_, HomePageSettings>(&query)
            .bind(form.show_headline)
            .bind(form.show_carousel)
            .bind(form.show_flash_sale)
            .bind(form.show_featured)
            .bind(form.show_new_arrivals)
            .bind(form.show_promotional)
            .bind(form.show_sale_banner)
            .bind(trimmed(&form.flash_sale_title))
            .bind(trimmed(&form.meta_title))
            .bind(trimmed(&form.meta_description))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update home page settings: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Home page settings updated");
        Ok(settings)
    }
}

fn wrap<S>(rows: Vec<S>, variant: fn(S) -> HomeContent) -> Vec<HomeContent> {
    rows.into_iter().map(variant).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn headline() -> HeadlineMessageForm {
        HeadlineMessageForm {
            message: Sentence(3..6).fake(),
            link_url: Some("  ".to_string()),
            background_color: Some("#000".to_string()),
            text_color: None,
            is_active: true,
            sort_order: 2,
            starts_at: None,
            ends_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_insert_binds_every_field() {
        let query = insert_query(&headline());
        let sql = query.sql();

        assert!(sql.starts_with("INSERT INTO headline_messages (message, link_url"));
        assert!(sql.contains("VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"));
        assert!(sql.ends_with(&format!("RETURNING {}", HeadlineMessage::COLUMNS)));
    }

    #[test]
    fn test_update_targets_row_by_id() {
        let id = Uuid::new_v4();
        let query = update_query(id, &headline());
        let sql = query.sql();

        assert!(sql.starts_with(
            "UPDATE headline_messages SET (message, link_url, background_color, text_color, is_active, sort_order, starts_at, ends_at, updated_at) = ROW("
        ));
        assert!(sql.contains("$8, NOW()) WHERE id = $9"));
    }

    #[test]
    fn test_field_lists_match_bind_counts() {
        fn placeholders<F: SectionForm>(form: &F) -> (usize, usize) {
            let query = insert_query(form);
            let binds = query.sql().matches('$').count();
            (F::FIELDS.split(',').count(), binds)
        }

        let new_arrival = NewArrivalSectionForm {
            title: "Just in".to_string(),
            subtitle: None,
            product_limit: 8,
            days_window: 30,
            is_active: true,
            sort_order: 0,
        };
        let (fields, binds) = placeholders(&new_arrival);
        assert_eq!(fields, binds);

        let (fields, binds) = placeholders(&headline());
        assert_eq!(fields, binds);
    }

    #[test]
    fn test_flash_price_must_undercut_regular() {
        assert!(check_flash_price(Decimal::new(1999, 2), Decimal::new(2999, 2)).is_ok());
        assert!(matches!(
            check_flash_price(Decimal::new(2999, 2), Decimal::new(2999, 2)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_trimmed_drops_blank_values() {
        assert_eq!(trimmed(&Some("  ".to_string())), None);
        assert_eq!(trimmed(&Some(" a ".to_string())), Some("a".to_string()));
        assert_eq!(trimmed(&None), None);
    }
}
