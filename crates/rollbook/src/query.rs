//! Visible-record filtering.
//!
//! The view is recomputed from scratch on every call; nothing is cached.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::StudentRecord;

/// Restricts the visible records by enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentFilter {
    /// Every record.
    #[default]
    All,
    /// Only enrolled records.
    Active,
    /// Only records not enrolled.
    Inactive,
}

impl EnrollmentFilter {
    /// Whether a record with this enrollment status passes the filter.
    #[must_use]
    pub fn admits(self, enrolled: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => enrolled,
            Self::Inactive => !enrolled,
        }
    }
}

impl std::fmt::Display for EnrollmentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Error returned for an unknown enrollment filter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid enrollment filter '{0}' (expected all, active or inactive)")]
pub struct ParseFilterError(String);

impl FromStr for EnrollmentFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// Search text plus enrollment filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Case-insensitive name substring; empty matches everything.
    pub search: String,
    /// Enrollment restriction.
    pub filter: EnrollmentFilter,
}

impl Query {
    /// Build a query from its parts.
    #[must_use]
    pub fn new(search: impl Into<String>, filter: EnrollmentFilter) -> Self {
        Self {
            search: search.into(),
            filter,
        }
    }

    /// Apply this query to `records`.
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [StudentRecord]) -> Vec<&'a StudentRecord> {
        filter_records(records, &self.search, self.filter)
    }
}

/// Records whose name contains `search` (ignoring case) and whose
/// enrollment passes `filter`, in their original order.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [StudentRecord],
    search: &str,
    filter: EnrollmentFilter,
) -> Vec<&'a StudentRecord> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .filter(|record| filter.admits(record.enrollment_status))
        .collect()
}
