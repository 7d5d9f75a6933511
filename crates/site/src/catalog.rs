//! Public product catalog.
//!
//! The catalog shown on `/products` is the static seed list merged with every
//! approved user submission. It is recomputed on each request; approval is
//! the publication mechanism, there is no separate published-products table.
//!
//! Filtering and pagination are pure functions so the search scenarios can be
//! tested without a database.

use serde::Deserialize;

use crate::models::ProductRequest;

/// Number of catalog entries per page.
pub const PAGE_SIZE: usize = 12;

/// One entry in the public catalog.
///
/// Either a static seed product or the projection of an approved submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub brand: String,
    pub category: String,
    /// Submitter display name; `None` for seed entries.
    pub submitted_by: Option<String>,
    pub image_url: Option<String>,
    /// Whether the entry is flagged as supporting the boycotted origin.
    /// Seed entries are flagged by definition.
    pub flagged: bool,
}

impl CatalogEntry {
    fn seed(name: &str, brand: &str, category: &str) -> Self {
        Self {
            name: name.to_owned(),
            brand: brand.to_owned(),
            category: category.to_owned(),
            submitted_by: None,
            image_url: None,
            flagged: true,
        }
    }

    /// Project an approved submission into a catalog entry.
    ///
    /// The brand is derived as the first whitespace token of the name and the
    /// category defaults to `"Other"` when the submitter left it blank.
    #[must_use]
    pub fn from_approved(request: &ProductRequest) -> Self {
        let brand = request
            .name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_owned();

        Self {
            name: request.name.clone(),
            brand,
            category: request
                .category
                .clone()
                .unwrap_or_else(|| "Other".to_owned()),
            submitted_by: Some(request.submitted_by.clone()),
            image_url: request.image_url.clone(),
            flagged: true,
        }
    }
}

/// The static seed catalog, A to Z.
#[must_use]
pub fn seed_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::seed("Ahava Cream", "Ahava", "Cosmetics"),
        CatalogEntry::seed("Arak", "Elite", "Beverages"),
        CatalogEntry::seed("Bamba", "Osem", "Food"),
        CatalogEntry::seed("Bissli", "Osem", "Food"),
        CatalogEntry::seed("Check Point Firewall", "Check Point", "Tech"),
        CatalogEntry::seed("Daniella Lehavi Handbag", "Daniella Lehavi", "Fashion"),
        CatalogEntry::seed("Eden Spring Water", "Eden Spring", "Beverages"),
        CatalogEntry::seed("Fiverr Services", "Fiverr", "Tech"),
        CatalogEntry::seed("Gamila Secret Soap", "Gamila Secret", "Cosmetics"),
        CatalogEntry::seed("Haaretz Newspaper", "Haaretz", "Media"),
        CatalogEntry::seed("Jaffa Oranges", "Jaffa", "Food"),
        CatalogEntry::seed("Keter Storage Box", "Keter", "Household"),
        CatalogEntry::seed("Laline Body Cream", "Laline", "Cosmetics"),
        CatalogEntry::seed("Max Brenner Chocolates", "Max Brenner", "Food"),
        CatalogEntry::seed("Mobileye System", "Mobileye", "Tech"),
        CatalogEntry::seed("Moraz Skincare", "Moraz", "Cosmetics"),
        CatalogEntry::seed("Nevo Spa Products", "Nevo", "Cosmetics"),
        CatalogEntry::seed("Osem Pasta", "Osem", "Food"),
        CatalogEntry::seed("Sabon Soap", "Sabon", "Cosmetics"),
        CatalogEntry::seed("Sabra Hummus", "Sabra", "Food"),
        CatalogEntry::seed("SodaStream Machine", "SodaStream", "Tech"),
        CatalogEntry::seed("Strauss Yogurt", "Strauss", "Food"),
        CatalogEntry::seed("Tabor Wine", "Tabor", "Beverages"),
        CatalogEntry::seed("Teva Generic Drugs", "Teva", "Pharmaceuticals"),
        CatalogEntry::seed("Tivall Vegetarian Products", "Tivall", "Food"),
        CatalogEntry::seed("Tnuva Milk", "Tnuva", "Food"),
        CatalogEntry::seed("Waze App", "Waze", "Tech"),
        CatalogEntry::seed("Wissotzky Tea", "Wissotzky", "Beverages"),
        CatalogEntry::seed("Wix Website Builder", "Wix", "Tech"),
    ]
}

/// Merge the seed list with approved submissions, sorted alphabetically by
/// name (case-insensitive).
#[must_use]
pub fn merged_catalog(approved: &[ProductRequest]) -> Vec<CatalogEntry> {
    let mut entries = seed_entries();
    entries.extend(approved.iter().map(CatalogEntry::from_approved));
    entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    entries
}

/// Active filter predicates for the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    /// Free-text query, matched case-insensitively against name OR brand.
    pub query: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Drop entries flagged as supporting the boycotted origin.
    pub exclude_flagged: bool,
}

impl CatalogFilter {
    fn matches(&self, entry: &CatalogEntry) -> bool {
        if self.exclude_flagged && entry.flagged {
            return false;
        }

        if let Some(category) = &self.category
            && entry.category != *category
        {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                entry.name.to_lowercase().contains(&query)
                    || entry.brand.to_lowercase().contains(&query)
            }
        }
    }
}

/// Apply a filter, preserving input order.
///
/// Pure and idempotent: filtering an already-filtered set with the same
/// predicates is a no-op.
#[must_use]
pub fn filter_entries(entries: &[CatalogEntry], filter: &CatalogFilter) -> Vec<CatalogEntry> {
    entries
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect()
}

/// Sorted, de-duplicated category list for the filter bar.
#[must_use]
pub fn categories(entries: &[CatalogEntry]) -> Vec<String> {
    let mut categories: Vec<String> = entries.iter().map(|e| e.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// One page of filtered results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// 1-based page index, clamped into range.
    pub page: usize,
    pub total_pages: usize,
    pub total_entries: usize,
}

/// Slice the filtered result set into a fixed-size page.
///
/// For `N` results and page size `P` there are `ceil(N / P)` pages; the last
/// page holds `N mod P` entries (or `P` when `N` divides evenly). The
/// requested page is clamped into `[1, max(total_pages, 1)]`, so a stale page
/// index from a previous filter never renders an empty page.
#[must_use]
pub fn paginate(entries: Vec<CatalogEntry>, page: usize, per_page: usize) -> CatalogPage {
    let total_entries = entries.len();
    let total_pages = total_entries.div_ceil(per_page.max(1));
    let page = page.clamp(1, total_pages.max(1));

    let entries = entries
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    CatalogPage {
        entries,
        page,
        total_pages,
        total_entries,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use nothanks_core::{RequestId, RequestStatus};

    use super::*;

    fn approved(name: &str, category: Option<&str>) -> ProductRequest {
        ProductRequest {
            id: RequestId::new(1),
            name: name.to_owned(),
            submitted_by: "Alice".to_owned(),
            image_url: None,
            barcode: None,
            category: category.map(str::to_owned),
            comment: None,
            evidence_url: None,
            alternatives: None,
            status: RequestStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn two_entry_catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::seed("Bamba", "Osem", "Food"),
            CatalogEntry::seed("Wix", "Wix", "Tech"),
        ]
    }

    #[test]
    fn test_search_matches_name_or_brand() {
        let entries = two_entry_catalog();

        let filter = CatalogFilter {
            query: Some("wi".to_owned()),
            ..CatalogFilter::default()
        };
        let result = filter_entries(&entries, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().name, "Wix");

        // Brand match: "osem" finds Bamba even though the name doesn't match
        let filter = CatalogFilter {
            query: Some("OSEM".to_owned()),
            ..CatalogFilter::default()
        };
        let result = filter_entries(&entries, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().name, "Bamba");
    }

    #[test]
    fn test_category_filter_is_exact() {
        let entries = two_entry_catalog();
        let filter = CatalogFilter {
            category: Some("Food".to_owned()),
            ..CatalogFilter::default()
        };
        let result = filter_entries(&entries, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().name, "Bamba");
    }

    #[test]
    fn test_exclude_flagged_drops_everything_when_all_flagged() {
        let entries = two_entry_catalog();
        let filter = CatalogFilter {
            exclude_flagged: true,
            ..CatalogFilter::default()
        };
        assert!(filter_entries(&entries, &filter).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let entries = merged_catalog(&[]);
        let filter = CatalogFilter {
            query: Some("bamba".to_owned()),
            category: None,
            exclude_flagged: false,
        };
        let once = filter_entries(&entries, &filter);
        let twice = filter_entries(&once, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_projection_derives_brand_and_category() {
        let entry = CatalogEntry::from_approved(&approved("Elite Coffee", None));
        assert_eq!(entry.brand, "Elite");
        assert_eq!(entry.category, "Other");
        assert_eq!(entry.submitted_by.as_deref(), Some("Alice"));
        assert!(entry.flagged);

        let entry = CatalogEntry::from_approved(&approved("Tara Milk", Some("Food")));
        assert_eq!(entry.brand, "Tara");
        assert_eq!(entry.category, "Food");
    }

    #[test]
    fn test_merged_catalog_is_sorted_and_includes_approved() {
        let catalog = merged_catalog(&[approved("Aroma Coffee", Some("Food"))]);
        assert_eq!(catalog.first().unwrap().name, "Ahava Cream");
        assert!(catalog.iter().any(|e| e.name == "Aroma Coffee"));

        let names: Vec<String> = catalog.iter().map(|e| e.name.to_lowercase()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_pagination_page_count() {
        let entries = merged_catalog(&[]);
        let total = entries.len();
        assert_eq!(total, 29);

        let page = paginate(entries.clone(), 1, 12);
        assert_eq!(page.total_pages, 3); // ceil(29 / 12)
        assert_eq!(page.entries.len(), 12);

        let last = paginate(entries, 3, 12);
        assert_eq!(last.entries.len(), 5); // 29 mod 12
    }

    #[test]
    fn test_pagination_exact_multiple() {
        let entries: Vec<CatalogEntry> = merged_catalog(&[])
            .into_iter()
            .take(24)
            .collect();
        let last = paginate(entries, 2, 12);
        assert_eq!(last.total_pages, 2);
        assert_eq!(last.entries.len(), 12);
    }

    #[test]
    fn test_pagination_clamps_out_of_range_page() {
        let entries = two_entry_catalog();

        let page = paginate(entries.clone(), 99, 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.entries.len(), 2);

        // An empty result set still reports page 1 of 0
        let page = paginate(Vec::new(), 5, 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_categories_are_sorted_unique() {
        let cats = categories(&merged_catalog(&[]));
        assert!(cats.contains(&"Food".to_owned()));
        assert!(cats.contains(&"Tech".to_owned()));
        let mut sorted = cats.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(cats, sorted);
    }
}
