//! Review status for user-submitted product requests.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a submitted product request.
///
/// Every request starts as [`Pending`](Self::Pending). Moderators move it to
/// [`Approved`](Self::Approved) (which publishes it to the public catalog) or
/// [`Rejected`](Self::Rejected). The generic edit form may set any state
/// directly; the accept/reject actions only transition out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "request_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// All states, in lifecycle order. Useful for select inputs.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Whether the request is still awaiting review.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the request is published to the public catalog.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid request status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        for status in RequestStatus::ALL {
            let parsed: RequestStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!("published".parse::<RequestStatus>().is_err());
        assert!("PENDING".parse::<RequestStatus>().is_err());
        assert!("".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
        assert!(RequestStatus::default().is_pending());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RequestStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
        let back: RequestStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, RequestStatus::Rejected);
    }
}
