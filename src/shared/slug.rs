//! URL slug generation.
//!
//! Slugs are derived from a display name: lowercased, every run of characters
//! outside `[a-z0-9]` collapsed to one hyphen, and leading/trailing hyphens
//! trimmed. The result always matches [`SLUG_REGEX`] or is empty.
//!
//! [`SLUG_REGEX`]: crate::shared::validation::SLUG_REGEX

use crate::core::error::AppError;

/// Convert arbitrary text into a URL-safe slug.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slug for a new record: an explicit slug wins, otherwise it is generated from `name`.
pub fn resolve_slug(name: &str, requested: Option<&str>) -> Result<String, AppError> {
    let source = match requested {
        Some(s) if !s.trim().is_empty() => s,
        _ => name,
    };

    non_empty(slugify(source))
}

/// Slug for an updated record.
///
/// While the stored slug still equals the generated slug of the old name, it
/// follows name changes. Once it has been edited by hand it is left alone
/// unless a new slug is requested explicitly.
pub fn sync_slug(
    old_name: &str,
    old_slug: &str,
    new_name: Option<&str>,
    requested: Option<&str>,
) -> Result<String, AppError> {
    if let Some(requested) = requested.filter(|s| !s.trim().is_empty()) {
        return non_empty(slugify(requested));
    }

    match new_name {
        Some(new_name) if slugify(old_name) == old_slug => non_empty(slugify(new_name)),
        _ => Ok(old_slug.to_string()),
    }
}

fn non_empty(slug: String) -> Result<String, AppError> {
    if slug.is_empty() {
        return Err(AppError::Validation(
            "slug cannot be empty; use a name containing letters or digits".to_string(),
        ));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::SLUG_REGEX;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Summer Dresses"), "summer-dresses");
        assert_eq!(slugify("  Men's T-Shirts & Tops!  "), "men-s-t-shirts-tops");
        assert_eq!(slugify("---already--slugged---"), "already-slugged");
        assert_eq!(slugify("Size 42 (EU)"), "size-42-eu");
        assert_eq!(slugify("Café Crème"), "caf-cr-me");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_is_idempotent_and_url_safe() {
        for _ in 0..200 {
            let input: String = Sentence(1..8).fake();
            let once = slugify(&input);
            assert_eq!(slugify(&once), once, "input: {input:?}");
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "input: {input:?}"
            );
            assert!(once.is_empty() || SLUG_REGEX.is_match(&once), "input: {input:?}");
        }
    }

    #[test]
    fn test_resolve_slug() {
        assert_eq!(resolve_slug("Winter Coats", None).unwrap(), "winter-coats");
        assert_eq!(resolve_slug("Winter Coats", Some("  ")).unwrap(), "winter-coats");
        assert_eq!(
            resolve_slug("Winter Coats", Some("Cold Weather")).unwrap(),
            "cold-weather"
        );
        assert!(resolve_slug("???", None).is_err());
    }

    #[test]
    fn test_sync_slug_follows_name_until_diverged() {
        // Auto-generated slug follows the rename
        assert_eq!(
            sync_slug("Winter Coats", "winter-coats", Some("Winter Jackets"), None).unwrap(),
            "winter-jackets"
        );

        // Hand-edited slug is kept
        assert_eq!(
            sync_slug("Winter Coats", "outerwear", Some("Winter Jackets"), None).unwrap(),
            "outerwear"
        );

        // No rename keeps the slug
        assert_eq!(
            sync_slug("Winter Coats", "winter-coats", None, None).unwrap(),
            "winter-coats"
        );

        // Explicit slug always wins
        assert_eq!(
            sync_slug("Winter Coats", "outerwear", None, Some("Coats 2026")).unwrap(),
            "coats-2026"
        );
    }
}
