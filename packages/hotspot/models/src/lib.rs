#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot, risk level and summary statistic types.
//!
//! A hotspot is a ~111 m grid cell holding at least
//! [`MIN_HOTSPOT_INCIDENTS`] verified incidents inside the active time
//! window. Risk levels are derived purely from the incident count.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Grid resolution in degrees per axis (~111 meters at the equator).
pub const GRID_RESOLUTION_DEGREES: f64 = 0.001;

/// Fewest incidents a grid cell needs to count as a hotspot.
pub const MIN_HOTSPOT_INCIDENTS: u64 = 2;

/// Incident count at which a hotspot becomes [`RiskLevel::Medium`].
pub const MEDIUM_RISK_INCIDENTS: u64 = 3;

/// Incident count at which a hotspot becomes [`RiskLevel::High`].
pub const HIGH_RISK_INCIDENTS: u64 = 5;

/// Risk classification of a hotspot, ordered from least to most severe.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RiskLevel {
    /// Exactly two incidents.
    Low,
    /// Three or four incidents.
    Medium,
    /// Five or more incidents.
    High,
}

impl RiskLevel {
    /// Classifies an incident count.
    ///
    /// Returns `None` for counts below [`MIN_HOTSPOT_INCIDENTS`], which
    /// never form a hotspot.
    #[must_use]
    pub const fn from_count(count: u64) -> Option<Self> {
        if count >= HIGH_RISK_INCIDENTS {
            Some(Self::High)
        } else if count >= MEDIUM_RISK_INCIDENTS {
            Some(Self::Medium)
        } else if count >= MIN_HOTSPOT_INCIDENTS {
            Some(Self::Low)
        } else {
            None
        }
    }

    /// Returns all variants of this enum, most severe first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// Scaling used to turn an incident count into a map circle radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RadiusScale {
    /// Smallest radius in meters.
    pub min_meters: f64,
    /// Largest radius in meters.
    pub max_meters: f64,
    /// Multiplier applied to the square root of the incident count.
    pub scale_factor: f64,
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self {
            min_meters: 50.0,
            max_meters: 150.0,
            scale_factor: 60.0,
        }
    }
}

impl RadiusScale {
    /// `sqrt(count) * scale_factor`, clamped to `[min_meters, max_meters]`.
    ///
    /// Unlike [`f64::clamp`] this never panics on a misconfigured scale;
    /// the minimum wins if `min_meters > max_meters`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::manual_clamp)]
    pub fn radius_for(&self, incident_count: u64) -> f64 {
        ((incident_count as f64).sqrt() * self.scale_factor)
            .min(self.max_meters)
            .max(self.min_meters)
    }
}

/// A grid cell with elevated incident density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Stable identifier derived from the grid cell (`"14.600_121.000"`).
    pub id: String,
    /// Centroid latitude of the contributing reports.
    pub latitude: f64,
    /// Centroid longitude of the contributing reports.
    pub longitude: f64,
    /// Number of contributing reports.
    pub incident_count: u64,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Display radius in meters.
    pub radius_meters: f64,
    /// First area label seen among the contributing reports.
    pub area: Option<String>,
    /// Identifiers of the contributing reports.
    pub report_ids: Vec<String>,
}

/// Aggregate statistics over a list of hotspots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotStats {
    /// Number of hotspots.
    pub total: u64,
    /// Hotspots classified [`RiskLevel::High`].
    pub high: u64,
    /// Hotspots classified [`RiskLevel::Medium`].
    pub medium: u64,
    /// Hotspots classified [`RiskLevel::Low`].
    pub low: u64,
    /// Sum of incident counts across all hotspots.
    pub total_incidents: u64,
    /// Mean incidents per hotspot, rounded to one decimal place.
    pub average_incidents_per_hotspot: f64,
    /// Hotspot with the highest incident count (first one wins on ties).
    pub most_dangerous: Option<Hotspot>,
}

impl HotspotStats {
    /// Number of hotspots at the given risk level.
    #[must_use]
    pub const fn count_for(&self, level: RiskLevel) -> u64 {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}
