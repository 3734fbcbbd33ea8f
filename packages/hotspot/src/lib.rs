#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident hotspot detection for the dashboard.
//!
//! Verified, non-sensitive reports inside a rolling time window are
//! snapped to a ~111 m grid; cells with two or more incidents become
//! hotspots tagged with a [`RiskLevel`]. [`HotspotEngine`] wraps the
//! pipeline in a bounded memoization cache keyed on the area filter,
//! the window and a coarse dataset version.
//!
//! The pipeline is synchronous and performs no I/O. Reports are pulled
//! from a [`ReportStore`] once per call, so callers decide when data is
//! refreshed.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod config;
pub mod stats;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hotspots_report_models::Report;
use thiserror::Error;

pub use aggregate::{AreaFilter, TimeWindow, aggregate};
pub use cache::{Fingerprint, HotspotCache};
pub use classify::{classify, classify_with};
pub use config::{ConfigError, HotspotConfig};
pub use hotspots_models::{Hotspot, HotspotStats, RadiusScale, RiskLevel};
pub use stats::{filter_hotspots_by_risk_level, get_hotspot_stats, get_most_dangerous_hotspot};
pub use store::ReportStore;

/// Errors that can occur during hotspot operations.
#[derive(Debug, Error)]
pub enum HotspotError {
    /// The days-window was not positive or could not be represented.
    #[error("Invalid days window: {days} (must be a positive number of days)")]
    InvalidDaysWindow {
        /// The rejected value.
        days: i64,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Runs the uncached pipeline: filter, aggregate and classify.
#[must_use]
pub fn compute_hotspots(
    reports: &[Report],
    filter: &AreaFilter,
    window: &TimeWindow,
    radius: &RadiusScale,
) -> Vec<Hotspot> {
    log::debug!(
        "Computing hotspots for {filter} since {} ({} reports)",
        window.start,
        reports.len()
    );

    let cells = aggregate(reports, filter, window);
    let eligible: u64 = cells.values().map(|c| c.count).sum();
    let hotspots = classify_with(cells, radius);

    let stats = get_hotspot_stats(&hotspots);
    log::info!(
        "Found {} hotspots for {filter} from {eligible} verified reports within {} days \
         (high: {}, medium: {}, low: {})",
        stats.total,
        window.days,
        stats.high,
        stats.medium,
        stats.low
    );

    hotspots
}

/// Cached entry point used by the dashboard layer.
pub struct HotspotEngine {
    store: Arc<dyn ReportStore>,
    cache: HotspotCache,
    config: HotspotConfig,
}

impl HotspotEngine {
    /// Creates an engine reading from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Config`] if `config` fails validation.
    pub fn new(store: Arc<dyn ReportStore>, config: HotspotConfig) -> Result<Self, HotspotError> {
        config.validate()?;
        log::debug!(
            "Hotspot engine ready (default window {} days, cache capacity {})",
            config.default_days_window,
            config.cache_capacity
        );

        Ok(Self {
            store,
            cache: HotspotCache::new(config.cache_capacity),
            config,
        })
    }

    /// Creates an engine with [`HotspotConfig::default`].
    #[must_use]
    pub fn with_defaults(store: Arc<dyn ReportStore>) -> Self {
        let config = HotspotConfig::default();
        Self {
            store,
            cache: HotspotCache::new(config.cache_capacity),
            config,
        }
    }

    /// Hotspots for `area` over the last `days_window` days, as of now.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::InvalidDaysWindow`] if `days_window` is
    /// not positive.
    pub fn calculate_hotspots(
        &self,
        area: Option<&str>,
        days_window: i64,
    ) -> Result<Arc<[Hotspot]>, HotspotError> {
        self.calculate_hotspots_at(area, days_window, Utc::now())
    }

    /// Hotspots for `area` over the configured default window, as of now.
    ///
    /// # Errors
    ///
    /// Never fails with a validated config; the signature matches
    /// [`Self::calculate_hotspots`].
    pub fn calculate_default_hotspots(
        &self,
        area: Option<&str>,
    ) -> Result<Arc<[Hotspot]>, HotspotError> {
        self.calculate_hotspots(area, i64::from(self.config.default_days_window))
    }

    /// Hotspots for `area` over the `days_window` days ending at `now`.
    ///
    /// The window is validated before the store is read or the cache is
    /// touched, so a rejected call leaves no trace. Cached results are
    /// keyed without `now`; a hit returns the result computed at the time
    /// of the original miss.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::InvalidDaysWindow`] if `days_window` is
    /// not positive or too large.
    pub fn calculate_hotspots_at(
        &self,
        area: Option<&str>,
        days_window: i64,
        now: DateTime<Utc>,
    ) -> Result<Arc<[Hotspot]>, HotspotError> {
        let window = TimeWindow::ending_at(now, days_window)?;
        let filter = AreaFilter::parse(area);
        let reports = self.store.snapshot();
        let fingerprint = Fingerprint::new(&filter, days_window, &reports);

        Ok(self.cache.get_or_compute(fingerprint, || {
            compute_hotspots(&reports, &filter, &window, &self.config.radius)
        }))
    }

    /// Clears all memoized results; the next call recomputes.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// The engine's cache.
    #[must_use]
    pub const fn cache(&self) -> &HotspotCache {
        &self.cache
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &HotspotConfig {
        &self.config
    }
}
