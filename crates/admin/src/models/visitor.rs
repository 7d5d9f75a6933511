//! Visitor rows as read by the analytics dashboard.

use chrono::{DateTime, Utc};

use nothanks_core::VisitorId;

/// One logged page view with its best-effort metadata.
///
/// Written by the site binary; the dashboard only ever reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Visitor {
    pub id: VisitorId,
    pub visited_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub page_url: String,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
    pub screen: Option<String>,
    pub language: Option<String>,
}
