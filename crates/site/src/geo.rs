//! Geolocation lookup client.
//!
//! Resolves a visitor's apparent IP to location and ISP metadata via an
//! ip-api.com style JSON endpoint. Lookups are strictly best-effort: failures,
//! timeouts, and private addresses all resolve to `None` so visitor tracking
//! never depends on this collaborator answering.
//!
//! Results are cached with `moka` (15-minute TTL) so repeated page views from
//! the same address do not hammer the lookup service.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Per-request timeout for the lookup service.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a resolved lookup stays cached.
const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Maximum number of cached addresses.
const CACHE_CAPACITY: u64 = 10_000;

/// Geolocation metadata for one IP address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
}

/// Response shape of the ip-api.com JSON endpoint.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: Option<String>,
    country: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    timezone: Option<String>,
    isp: Option<String>,
}

/// Client for the geolocation lookup service.
#[derive(Clone)]
pub struct GeoClient {
    inner: Arc<GeoClientInner>,
}

struct GeoClientInner {
    client: reqwest::Client,
    /// URL template with an `{ip}` placeholder.
    url_template: String,
    cache: Cache<String, Option<GeoInfo>>,
}

impl GeoClient {
    /// Create a new geolocation client.
    ///
    /// `url_template` must contain an `{ip}` placeholder.
    #[must_use]
    pub fn new(url_template: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(GeoClientInner {
                client,
                url_template: url_template.to_string(),
                cache,
            }),
        }
    }

    /// Look up geolocation metadata for an IP address.
    ///
    /// Returns `None` for private/loopback addresses, unparseable input, and
    /// any lookup failure. Never returns an error: callers treat geolocation
    /// as optional decoration on the visitor row.
    #[instrument(skip(self))]
    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = ip.trim().parse().ok()?;
        if !is_lookupable(addr) {
            debug!(%addr, "skipping geo lookup for non-public address");
            return None;
        }

        let key = addr.to_string();
        self.inner
            .cache
            .get_with(key.clone(), self.fetch(key))
            .await
    }

    async fn fetch(&self, ip: String) -> Option<GeoInfo> {
        let url = self.inner.url_template.replace("{ip}", &ip);

        let response = match self.inner.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "geo lookup request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "geo lookup returned non-success status");
            return None;
        }

        let body: LookupResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                debug!(error = %e, "geo lookup response did not parse");
                return None;
            }
        };

        // ip-api.com reports failures with HTTP 200 and status: "fail"
        if body.status.as_deref() == Some("fail") {
            debug!(%ip, "geo lookup reported failure");
            return None;
        }

        Some(GeoInfo {
            country: body.country,
            region: body.region_name,
            city: body.city,
            latitude: body.lat,
            longitude: body.lon,
            timezone: body.timezone,
            isp: body.isp,
        })
    }
}

/// Whether an address is worth sending to the lookup service.
fn is_lookupable(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            !v4.is_private() && !v4.is_loopback() && !v4.is_link_local() && !v4.is_unspecified()
        }
        IpAddr::V6(v6) => !v6.is_loopback() && !v6.is_unspecified(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_private_addresses_are_not_lookupable() {
        assert!(!is_lookupable("127.0.0.1".parse().unwrap()));
        assert!(!is_lookupable("10.0.0.5".parse().unwrap()));
        assert!(!is_lookupable("192.168.1.1".parse().unwrap()));
        assert!(!is_lookupable("0.0.0.0".parse().unwrap()));
        assert!(!is_lookupable("::1".parse().unwrap()));
    }

    #[test]
    fn test_public_addresses_are_lookupable() {
        assert!(is_lookupable("8.8.8.8".parse().unwrap()));
        assert!(is_lookupable("2001:4860:4860::8888".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_lookup_rejects_garbage_input() {
        let client = GeoClient::new("http://127.0.0.1:1/json/{ip}");
        assert_eq!(client.lookup("not-an-ip").await, None);
        assert_eq!(client.lookup("").await, None);
    }

    #[tokio::test]
    async fn test_lookup_swallows_connection_failure() {
        // Nothing listens on port 1; the lookup must degrade to None.
        let client = GeoClient::new("http://127.0.0.1:1/json/{ip}");
        assert_eq!(client.lookup("8.8.8.8").await, None);
    }

    #[test]
    fn test_response_parses_ip_api_shape() {
        let json = r#"{
            "status": "success",
            "country": "Jordan",
            "regionName": "Amman",
            "city": "Amman",
            "lat": 31.95,
            "lon": 35.93,
            "timezone": "Asia/Amman",
            "isp": "Orange Jordan"
        }"#;
        let parsed: LookupResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.country.as_deref(), Some("Jordan"));
        assert_eq!(parsed.region_name.as_deref(), Some("Amman"));
        assert!((parsed.lat.unwrap() - 31.95).abs() < f64::EPSILON);
    }
}
