use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase alphanumeric segments joined by single hyphens
    /// - Valid: "summer-dresses", "tee123", "a-b-c"
    /// - Invalid: "-tee", "tee-", "tee--shirt", "Tee", "tee_shirt"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for CSS hex colors: "#fff" or "#ffffff" (case-insensitive)
    pub static ref HEX_COLOR_REGEX: Regex =
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
}

/// Check that an optional schedule window is ordered
pub fn validate_date_window(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end <= start => {
            let mut err = ValidationError::new("date_window");
            err.message = Some("ends_at must be after starts_at".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Reject strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative_amount");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("summer-dresses"));
        assert!(SLUG_REGEX.is_match("tee123"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-tee")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("tee-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("tee--shirt")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Tee")); // uppercase
        assert!(!SLUG_REGEX.is_match("tee_shirt")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("tee shirt")); // space
    }

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#fff"));
        assert!(HEX_COLOR_REGEX.is_match("#1A2b3C"));
        assert!(!HEX_COLOR_REGEX.is_match("fff"));
        assert!(!HEX_COLOR_REGEX.is_match("#ffff"));
        assert!(!HEX_COLOR_REGEX.is_match("#gggggg"));
    }

    #[test]
    fn test_date_window() {
        let now = Utc::now();
        assert!(validate_date_window(None, None).is_ok());
        assert!(validate_date_window(Some(now), None).is_ok());
        assert!(validate_date_window(None, Some(now)).is_ok());
        assert!(validate_date_window(Some(now), Some(now + Duration::hours(1))).is_ok());
        assert!(validate_date_window(Some(now), Some(now)).is_err());
        assert!(validate_date_window(Some(now), Some(now - Duration::hours(1))).is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("Shirts").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_amounts() {
        assert!(validate_positive_amount(&Decimal::new(1, 2)).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::new(-5, 0)).is_err());
        assert!(validate_non_negative_amount(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(&Decimal::new(-1, 2)).is_err());
    }
}
