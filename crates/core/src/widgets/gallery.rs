//! Gallery category filtering.

/// Filter value that matches every item.
pub const ALL_CATEGORIES: &str = "all";

/// Something shown in the gallery.
pub trait Categorized {
    fn category(&self) -> &str;
}

/// Items matching `category`, in their original order.
///
/// An empty filter or [`ALL_CATEGORIES`] returns everything. Matching
/// ignores ASCII case and surrounding whitespace.
pub fn filter_gallery<'a, T: Categorized>(items: &'a [T], category: &str) -> Vec<&'a T> {
    let wanted = category.trim();
    if wanted.is_empty() || wanted.eq_ignore_ascii_case(ALL_CATEGORIES) {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| item.category().trim().eq_ignore_ascii_case(wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Photo(&'static str, &'static str);

    impl Categorized for Photo {
        fn category(&self) -> &str {
            self.1
        }
    }

    const PHOTOS: [Photo; 4] = [
        Photo("kitchen", "Residential"),
        Photo("warehouse", "Commercial"),
        Photo("attic", "residential"),
        Photo("garden", "Outdoor"),
    ];

    #[test]
    fn test_all_returns_everything() {
        assert_eq!(filter_gallery(&PHOTOS, "all").len(), 4);
        assert_eq!(filter_gallery(&PHOTOS, "ALL").len(), 4);
        assert_eq!(filter_gallery(&PHOTOS, " ").len(), 4);
    }

    #[test]
    fn test_filter_preserves_order_and_ignores_case() {
        let names: Vec<_> = filter_gallery(&PHOTOS, "Residential")
            .into_iter()
            .map(|p| p.0)
            .collect();
        assert_eq!(names, vec!["kitchen", "attic"]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_gallery(&PHOTOS, "Marine").is_empty());
    }
}
