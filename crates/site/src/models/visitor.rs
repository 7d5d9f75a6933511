//! Visitor record types.
//!
//! The site only ever inserts visitor rows; reading and aggregation happen in
//! the admin binary. Rows are immutable once written and carry whatever
//! best-effort metadata was available at track time.

/// A visitor row about to be inserted.
///
/// Every field except the page URL is optional: tracking must never fail a
/// page view because a header was missing or the geolocation lookup did not
/// answer. The `visited_at` timestamp is stamped by the database at write
/// time, so lookup latency never skews it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVisitor {
    pub page_url: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub language: Option<String>,
    pub screen: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
}
