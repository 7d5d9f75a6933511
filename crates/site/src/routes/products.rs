//! Public product catalog route.
//!
//! Merges the static seed list with approved submissions, applies the active
//! filter, and slices one page. The filter form deliberately carries no page
//! parameter, so changing any predicate lands back on page 1; the pagination
//! links preserve the active filters.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{self, CatalogFilter, CatalogPage, PAGE_SIZE};
use crate::db::ProductRequestRepository;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::tracker::ClientInfo;

/// Query parameters for the catalog page.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Free-text search over name and brand.
    #[serde(default)]
    pub q: Option<String>,
    /// Exact category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// Drop entries flagged as supporting the boycotted origin.
    #[serde(default)]
    pub exclude: bool,
    /// 1-based page index.
    #[serde(default)]
    pub page: Option<usize>,
}

impl CatalogQuery {
    fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            query: self.q.clone().filter(|s| !s.trim().is_empty()),
            category: self.category.clone().filter(|s| !s.is_empty()),
            exclude_flagged: self.exclude,
        }
    }

    /// Query-string fragment carrying the active filters, for pagination
    /// links.
    fn filter_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(q) = self.q.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(format!("q={}", urlencode(q)));
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("category={}", urlencode(category)));
        }
        if self.exclude {
            parts.push("exclude=true".to_string());
        }
        parts.join("&")
    }
}

/// Minimal percent-encoding for query-string values.
fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// One category option in the filter bar.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

/// One numbered link in the pagination bar.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct CatalogTemplate {
    pub page: CatalogPage,
    pub categories: Vec<CategoryOption>,
    pub query: String,
    pub exclude: bool,
    /// Active filters as a query-string fragment for pagination links.
    pub filter_qs: String,
    /// Numbered links for the pagination bar.
    pub pages: Vec<PageLink>,
}

/// GET /products
///
/// # Errors
///
/// Returns `AppError::Database` if approved submissions cannot be fetched.
#[instrument(skip(state, client))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
    client: ClientInfo,
) -> Result<CatalogTemplate> {
    state.tracker().record("/products", client);

    let approved = ProductRequestRepository::new(state.pool())
        .list_approved()
        .await?;

    let entries = catalog::merged_catalog(&approved);

    let selected_category = params.category.clone().unwrap_or_default();
    let categories = catalog::categories(&entries)
        .into_iter()
        .map(|name| CategoryOption {
            selected: name == selected_category,
            name,
        })
        .collect();

    let filter = params.filter();
    let filtered = catalog::filter_entries(&entries, &filter);
    let page = catalog::paginate(filtered, params.page.unwrap_or(1), PAGE_SIZE);

    let pages = (1..=page.total_pages)
        .map(|number| PageLink {
            number,
            current: number == page.page,
        })
        .collect();

    Ok(CatalogTemplate {
        page,
        categories,
        pages,
        query: params.q.clone().unwrap_or_default(),
        exclude: params.exclude,
        filter_qs: params.filter_query_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_string_preserves_active_filters() {
        let params = CatalogQuery {
            q: Some("bamba".to_string()),
            category: Some("Food".to_string()),
            exclude: true,
            page: Some(3),
        };
        // The page index is deliberately absent: pagination links append
        // their own, and filter changes reset to page 1.
        assert_eq!(
            params.filter_query_string(),
            "q=bamba&category=Food&exclude=true"
        );
    }

    #[test]
    fn test_filter_query_string_empty_when_unfiltered() {
        assert_eq!(CatalogQuery::default().filter_query_string(), "");
    }

    #[test]
    fn test_blank_query_is_no_filter() {
        let params = CatalogQuery {
            q: Some("   ".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(params.filter(), CatalogFilter::default());
    }

    #[test]
    fn test_query_values_are_percent_encoded() {
        let params = CatalogQuery {
            q: Some("max brenner".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(params.filter_query_string(), "q=max+brenner");
    }
}
