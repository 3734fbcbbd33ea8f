//! Report eligibility filtering and grid-cell aggregation.
//!
//! Reports are snapped to a [`GRID_RESOLUTION_DEGREES`] grid by rounding
//! each coordinate. Every eligible report landing in the same cell bumps
//! that cell's count and folds its exact position into a running mean, so
//! the centroid reflects where incidents actually happened rather than the
//! grid anchor.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use hotspots_models::GRID_RESOLUTION_DEGREES;
use hotspots_report_models::Report;
use strum_macros::{AsRefStr, Display};

use crate::HotspotError;

/// Fingerprint spelling of "no area filter".
pub const ALL_AREAS: &str = "all";

/// Optional restriction to a single administrative area.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AreaFilter {
    /// Every area, including reports with no area label.
    All,
    /// A single area, matched case-insensitively.
    Area(String),
}

impl AreaFilter {
    /// Interprets a caller-supplied filter.
    ///
    /// `None`, blank strings and `"all"` (any case) mean no filter.
    #[must_use]
    pub fn parse(filter: Option<&str>) -> Self {
        match filter.map(str::trim) {
            None => Self::All,
            Some(f) if f.is_empty() || f.eq_ignore_ascii_case(ALL_AREAS) => Self::All,
            Some(f) => Self::Area(f.to_string()),
        }
    }

    /// Whether a report with the given area label passes this filter.
    #[must_use]
    pub fn matches(&self, area: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Area(wanted) => {
                area.is_some_and(|a| a.trim().to_lowercase() == wanted.to_lowercase())
            }
        }
    }

    /// Normalized form used in cache fingerprints.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::All => ALL_AREAS.to_string(),
            Self::Area(area) => area.to_lowercase(),
        }
    }
}

impl std::fmt::Display for AreaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all areas"),
            Self::Area(area) => write!(f, "{area}"),
        }
    }
}

/// Inclusive `[start, end]` lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Oldest timestamp still inside the window.
    pub start: DateTime<Utc>,
    /// Reference "now".
    pub end: DateTime<Utc>,
    /// Window length in days.
    pub days: i64,
}

impl TimeWindow {
    /// Builds the window of `days` days ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::InvalidDaysWindow`] if `days` is not
    /// positive or too large to subtract from `now`.
    pub fn ending_at(now: DateTime<Utc>, days: i64) -> Result<Self, HotspotError> {
        if days <= 0 {
            return Err(HotspotError::InvalidDaysWindow { days });
        }

        let start = TimeDelta::try_days(days)
            .and_then(|delta| now.checked_sub_signed(delta))
            .ok_or(HotspotError::InvalidDaysWindow { days })?;

        Ok(Self {
            start,
            end: now,
            days,
        })
    }

    /// Whether `at` falls inside the window, both ends inclusive.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Quantized grid position, as integer multiples of the grid resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCellKey {
    lat_index: i64,
    lng_index: i64,
}

impl GridCellKey {
    /// Snaps a position to its grid cell.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_position(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_index: (latitude / GRID_RESOLUTION_DEGREES).round() as i64,
            lng_index: (longitude / GRID_RESOLUTION_DEGREES).round() as i64,
        }
    }

    /// Latitude of the grid anchor.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn latitude(self) -> f64 {
        self.lat_index as f64 * GRID_RESOLUTION_DEGREES
    }

    /// Longitude of the grid anchor.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn longitude(self) -> f64 {
        self.lng_index as f64 * GRID_RESOLUTION_DEGREES
    }

    /// Stable string id, e.g. `"14.600_121.000"`.
    #[must_use]
    pub fn id(self) -> String {
        format!("{:.3}_{:.3}", self.latitude(), self.longitude())
    }
}

/// Running statistics for one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Cell this data belongs to.
    pub key: GridCellKey,
    /// Number of eligible reports in the cell.
    pub count: u64,
    /// Mean latitude of those reports.
    pub latitude: f64,
    /// Mean longitude of those reports.
    pub longitude: f64,
    /// First area label seen.
    pub area: Option<String>,
    /// Contributing report identifiers, in snapshot order.
    pub report_ids: Vec<String>,
}

impl GridCell {
    const fn new(key: GridCellKey) -> Self {
        Self {
            key,
            count: 0,
            latitude: 0.0,
            longitude: 0.0,
            area: None,
            report_ids: Vec::new(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn add(&mut self, report: &Report, latitude: f64, longitude: f64) {
        self.count += 1;
        let n = self.count as f64;
        self.latitude += (latitude - self.latitude) / n;
        self.longitude += (longitude - self.longitude) / n;

        if self.area.is_none() {
            self.area = report.area_label().map(ToString::to_string);
        }
        self.report_ids.push(report.id.clone());
    }
}

/// Why a report was left out of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Exclusion {
    /// Status is not `Verified`.
    NotVerified,
    /// Flagged sensitive.
    Sensitive,
    /// Area label does not match the filter.
    AreaMismatch,
    /// Missing or unusable coordinates.
    NoPosition,
    /// Missing timestamp.
    NoTimestamp,
    /// Timestamp outside the window.
    OutsideWindow,
}

/// Applies the eligibility rules in order and returns the report's
/// position if it qualifies.
///
/// # Errors
///
/// Returns the first [`Exclusion`] rule the report fails.
pub fn check_eligibility(
    report: &Report,
    filter: &AreaFilter,
    window: &TimeWindow,
) -> Result<(f64, f64), Exclusion> {
    if !report.is_verified() {
        return Err(Exclusion::NotVerified);
    }
    if report.is_sensitive {
        return Err(Exclusion::Sensitive);
    }
    if !filter.matches(report.area_label()) {
        return Err(Exclusion::AreaMismatch);
    }
    let position = report.position().ok_or(Exclusion::NoPosition)?;
    let reported_at = report.reported_at.ok_or(Exclusion::NoTimestamp)?;
    if !window.contains(reported_at) {
        return Err(Exclusion::OutsideWindow);
    }

    Ok(position)
}

/// Groups eligible reports into grid cells.
///
/// Pure with respect to its inputs; cells come back ordered by key.
#[must_use]
pub fn aggregate(
    reports: &[Report],
    filter: &AreaFilter,
    window: &TimeWindow,
) -> BTreeMap<GridCellKey, GridCell> {
    let mut cells: BTreeMap<GridCellKey, GridCell> = BTreeMap::new();

    for report in reports {
        let (lat, lng) = match check_eligibility(report, filter, window) {
            Ok(position) => position,
            Err(reason) => {
                log::trace!("Skipping report {}: {reason}", report.id);
                continue;
            }
        };

        let key = GridCellKey::for_position(lat, lng);
        cells
            .entry(key)
            .or_insert_with(|| GridCell::new(key))
            .add(report, lat, lng);
    }

    cells
}
