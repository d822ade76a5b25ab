//! URL-safe slug derivation from display names.

/// Derive a URL-safe lowercase slug from a display name.
///
/// Alphanumeric characters are lowercased; every run of other
/// characters collapses to a single `-`, with no leading or trailing
/// dashes. Names and slugs are re-derived together - renaming a
/// category or product re-slugifies it.
///
/// ```
/// use kiosk_core::slugify;
///
/// assert_eq!(slugify("Gaming Laptops"), "gaming-laptops");
/// assert_eq!(slugify("Tea & Coffee (Loose)"), "tea-coffee-loose");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(slugify("Electronics"), "electronics");
    }

    #[test]
    fn test_spaces_become_single_dash() {
        assert_eq!(slugify("Gaming   Laptops"), "gaming-laptops");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("Tea & Coffee (Loose)"), "tea-coffee-loose");
        assert_eq!(slugify("50% Off!"), "50-off");
    }

    #[test]
    fn test_no_edge_dashes() {
        assert_eq!(slugify("  trimmed  "), "trimmed");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_unicode_lowercase() {
        assert_eq!(slugify("Café Münster"), "café-münster");
    }
}
