#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident report types as exposed by the external report store.
//!
//! The hotspot engine only ever reads snapshots of these reports. Fields
//! that upstream data may leave blank (position, timestamp, area) are
//! optional here so that a malformed report can still be represented and
//! then skipped during aggregation instead of failing the whole snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Area label used by the report store when no district was recorded.
pub const UNKNOWN_AREA: &str = "Unknown";

/// Moderation status of a submitted report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum VerificationStatus {
    /// Submitted but not yet reviewed.
    #[serde(alias = "pending", alias = "PENDING")]
    Pending,
    /// Reviewed and confirmed by a moderator.
    #[serde(alias = "verified", alias = "VERIFIED")]
    Verified,
    /// Reviewed and dismissed.
    #[serde(alias = "rejected", alias = "REJECTED")]
    Rejected,
}

impl VerificationStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Pending, Self::Verified, Self::Rejected]
    }
}

/// A geotagged incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Identifier assigned by the report store.
    pub id: String,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// When the incident was reported.
    pub reported_at: Option<DateTime<Utc>>,
    /// Moderation status.
    pub status: VerificationStatus,
    /// Administrative district (barangay) name.
    #[serde(default)]
    pub area: Option<String>,
    /// Sensitive reports are never aggregated spatially.
    #[serde(default)]
    pub is_sensitive: bool,
}

impl Report {
    /// Whether a moderator has verified this report.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }

    /// Returns `(latitude, longitude)` if both coordinates are usable.
    ///
    /// Missing, non-finite and exactly-zero coordinates are all treated as
    /// "no position": upstream forms store `0` when the map pin was never
    /// placed.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.filter(|v| v.is_finite() && *v != 0.0)?;
        let lng = self.longitude.filter(|v| v.is_finite() && *v != 0.0)?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }

        Some((lat, lng))
    }

    /// Returns the trimmed area label, or `None` if it is blank or the
    /// store's [`UNKNOWN_AREA`] placeholder.
    #[must_use]
    pub fn area_label(&self) -> Option<&str> {
        self.area
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(UNKNOWN_AREA))
    }
}
