//! Visitor analytics.
//!
//! Pure aggregation over fetched visitor rows (the metric cards on the
//! dashboard) and the CSV export. Both operate on in-memory slices so they
//! are testable without a database.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::Visitor;

/// How many rows the dashboard highlight table shows.
pub const RECENT_ROWS: usize = 30;

/// Aggregated visitor metrics for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorStats {
    pub total: usize,
    /// Visits whose timestamp falls on the given day (UTC).
    pub today: usize,
    pub unique_ips: usize,
    pub unique_cities: usize,
    pub unique_countries: usize,
}

impl VisitorStats {
    /// Compute stats over a set of visitor rows.
    ///
    /// `now` anchors the "today" bucket; passing it in keeps the function
    /// pure.
    #[must_use]
    pub fn compute(visitors: &[Visitor], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();

        let mut ips = HashSet::new();
        let mut cities = HashSet::new();
        let mut countries = HashSet::new();
        let mut today_count = 0;

        for visitor in visitors {
            if visitor.visited_at.date_naive() == today {
                today_count += 1;
            }
            if let Some(ip) = &visitor.ip_address {
                ips.insert(ip.as_str());
            }
            if let Some(city) = &visitor.city {
                cities.insert(city.as_str());
            }
            if let Some(country) = &visitor.country {
                countries.insert(country.as_str());
            }
        }

        Self {
            total: visitors.len(),
            today: today_count,
            unique_ips: ips.len(),
            unique_cities: cities.len(),
            unique_countries: countries.len(),
        }
    }
}

/// Placeholder written for absent optional fields in the export.
const ABSENT: &str = "N/A";

/// Render visitor rows as CSV.
///
/// Uses a real CSV writer so fields containing commas or quotes are escaped
/// properly instead of corrupting the file.
///
/// # Errors
///
/// Returns `csv::Error` if serialization fails.
pub fn export_csv(visitors: &[Visitor]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "ID",
        "Visited At",
        "IP Address",
        "User Agent",
        "Page URL",
        "Country",
        "City",
        "Latitude",
        "Longitude",
        "ISP",
        "Screen",
    ])?;

    for visitor in visitors {
        writer.write_record([
            visitor.id.to_string(),
            visitor.visited_at.to_rfc3339(),
            field(visitor.ip_address.as_deref()),
            field(visitor.user_agent.as_deref()),
            visitor.page_url.clone(),
            field(visitor.country.as_deref()),
            field(visitor.city.as_deref()),
            float_field(visitor.latitude),
            float_field(visitor.longitude),
            field(visitor.isp.as_deref()),
            field(visitor.screen.as_deref()),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
}

fn field(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT).to_string()
}

fn float_field(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| v.to_string())
}
