//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format a timestamp for display in tables.
///
/// Usage in templates: `{{ request.created_at|datetime }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn datetime(
    value: impl std::borrow::Borrow<DateTime<Utc>>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.borrow().format("%Y-%m-%d %H:%M UTC").to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    #[test]
    fn test_datetime_format() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap();
        assert_eq!(
            at.format("%Y-%m-%d %H:%M UTC").to_string(),
            "2026-08-05 09:30 UTC"
        );
    }
}
