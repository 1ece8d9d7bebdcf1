use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self {
            total,
            page: None,
            page_size: None,
        }
    }

    pub fn paginated(total: i64, pagination: &PaginationQuery) -> Self {
        Self {
            total,
            page: Some(pagination.page.clamp(1, MAX_PAGE)),
            page_size: Some(pagination.limit()),
        }
    }
}

/// Returned by delete endpoints so clients can drop the id from local lists
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedDto {
    pub id: Uuid,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page.clamp(1, MAX_PAGE) - 1) * self.limit()
    }

    /// Get clamped page_size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset_and_limit() {
        let q = PaginationQuery {
            page: 3,
            page_size: 20,
        };
        assert_eq!(q.offset(), 40);
        assert_eq!(q.limit(), 20);
    }

    #[test]
    fn test_pagination_clamps_out_of_range_values() {
        let q = PaginationQuery {
            page: 0,
            page_size: 1000,
        };
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);

        let q = PaginationQuery {
            page: 2,
            page_size: 0,
        };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 1);
    }

    #[test]
    fn test_pagination_huge_page_does_not_overflow() {
        let q = PaginationQuery {
            page: i64::MAX,
            page_size: 100,
        };
        assert_eq!(q.offset(), (MAX_PAGE - 1) * 100);
    }
}
