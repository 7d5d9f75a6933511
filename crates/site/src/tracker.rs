//! Visitor tracking.
//!
//! Every tracked page view produces one row in the `visitors` table. Tracking
//! is fire-and-forget: the row is written from a spawned task, the geolocation
//! lookup is best-effort, and every failure is logged and swallowed so page
//! rendering never blocks on it.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::db::VisitorRepository;
use crate::geo::GeoClient;
use crate::models::NewVisitor;

/// Request metadata captured for a visitor row.
///
/// Extracted from proxy headers and the standard request headers; every field
/// is optional because tracking must work with whatever the client sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub language: Option<String>,
    /// Viewport dimensions (e.g. `1920x1080`), reported by a beacon cookie.
    pub screen: Option<String>,
}

impl ClientInfo {
    /// Build client info from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: client_ip(headers),
            user_agent: header_string(headers, "user-agent"),
            referrer: header_string(headers, "referer"),
            language: first_language(headers),
            screen: viewport_cookie(headers),
        }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Resolve the client IP from proxy headers.
///
/// Checks `X-Forwarded-For` (first hop) then `X-Real-IP`. Behind no proxy
/// there is no trustworthy address, so the field stays absent.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Some(forwarded.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// First tag of the `Accept-Language` header (e.g. `en-US`).
fn first_language(headers: &HeaderMap) -> Option<String> {
    headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.split(';').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Viewport dimensions from the `viewport` cookie set by the base template.
fn viewport_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == "viewport").then_some(value)
        })
        .find(|v| is_valid_viewport(v))
        .map(String::from)
}

/// A viewport value is `<width>x<height>` with both parts numeric.
fn is_valid_viewport(value: &str) -> bool {
    match value.split_once('x') {
        Some((w, h)) => w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok(),
        None => false,
    }
}

/// Records page views into the `visitors` table.
#[derive(Clone)]
pub struct VisitorTracker {
    pool: PgPool,
    geo: GeoClient,
}

impl VisitorTracker {
    /// Create a new tracker.
    #[must_use]
    pub const fn new(pool: PgPool, geo: GeoClient) -> Self {
        Self { pool, geo }
    }

    /// Record one page view.
    ///
    /// Spawns a task and returns immediately. The geolocation lookup runs
    /// first so its latency never delays the page, and the row timestamp is
    /// stamped by the database at insert time. There is no deduplication:
    /// repeated loads from the same client each produce their own row.
    pub fn record(&self, page_url: &str, client: ClientInfo) {
        let tracker = self.clone();
        let page_url = page_url.to_string();

        tokio::spawn(async move {
            let visitor = tracker.build_visitor(page_url, client).await;
            let repo = VisitorRepository::new(&tracker.pool);
            if let Err(e) = repo.insert(&visitor).await {
                warn!(error = %e, page_url = %visitor.page_url, "failed to record visitor");
            }
        });
    }

    /// Resolve geolocation and assemble the row to insert.
    async fn build_visitor(&self, page_url: String, client: ClientInfo) -> NewVisitor {
        let geo = match &client.ip_address {
            Some(ip) => self.geo.lookup(ip).await,
            None => None,
        };

        if geo.is_none() {
            debug!(page_url = %page_url, "visitor recorded without geolocation");
        }
        let geo = geo.unwrap_or_default();

        NewVisitor {
            page_url,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            referrer: client.referrer,
            language: client.language,
            screen: client.screen,
            country: geo.country,
            region: geo.region,
            city: geo.city,
            latitude: geo.latitude,
            longitude: geo.longitude,
            timezone: geo.timezone,
            isp: geo.isp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(client_ip(&h).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let h = headers(&[("x-real-ip", "203.0.113.9")]);
        assert_eq!(client_ip(&h).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_no_proxy_headers_means_no_ip() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_first_language_tag() {
        let h = headers(&[("accept-language", "ar-JO,ar;q=0.9,en;q=0.8")]);
        assert_eq!(first_language(&h).as_deref(), Some("ar-JO"));
    }

    #[test]
    fn test_viewport_cookie_is_validated() {
        let h = headers(&[("cookie", "session=abc; viewport=1920x1080")]);
        assert_eq!(viewport_cookie(&h).as_deref(), Some("1920x1080"));

        let bad = headers(&[("cookie", "viewport=<script>")]);
        assert_eq!(viewport_cookie(&bad), None);
    }

    #[test]
    fn test_client_info_from_headers() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7"),
            ("user-agent", "Mozilla/5.0"),
            ("referer", "https://example.org/"),
            ("accept-language", "en-US,en;q=0.5"),
        ]);
        let info = ClientInfo::from_headers(&h);
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(info.referrer.as_deref(), Some("https://example.org/"));
        assert_eq!(info.language.as_deref(), Some("en-US"));
        assert_eq!(info.screen, None);
    }
}
