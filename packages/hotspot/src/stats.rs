//! Summary statistics over a computed hotspot list.
//!
//! None of these functions touch the cache; they work on whatever slice
//! the caller hands them, in the caller's order.

use hotspots_models::{Hotspot, HotspotStats, RiskLevel};

/// Summarizes `hotspots`. An empty slice yields all-zero statistics and
/// no most-dangerous hotspot.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn get_hotspot_stats(hotspots: &[Hotspot]) -> HotspotStats {
    if hotspots.is_empty() {
        return HotspotStats::default();
    }

    let count_at = |level: RiskLevel| -> u64 {
        hotspots.iter().filter(|h| h.risk_level == level).count() as u64
    };

    let total = hotspots.len() as u64;
    let total_incidents: u64 = hotspots.iter().map(|h| h.incident_count).sum();
    let average = total_incidents as f64 / total as f64;

    HotspotStats {
        total,
        high: count_at(RiskLevel::High),
        medium: count_at(RiskLevel::Medium),
        low: count_at(RiskLevel::Low),
        total_incidents,
        average_incidents_per_hotspot: (average * 10.0).round() / 10.0,
        most_dangerous: get_most_dangerous_hotspot(hotspots).cloned(),
    }
}

/// Returns the hotspot with the highest incident count.
///
/// When several share the maximum, the first one in slice order wins.
#[must_use]
pub fn get_most_dangerous_hotspot(hotspots: &[Hotspot]) -> Option<&Hotspot> {
    hotspots.iter().fold(None, |best, h| match best {
        Some(b) if b.incident_count >= h.incident_count => Some(b),
        _ => Some(h),
    })
}

/// Returns the hotspots at `level`, preserving order.
#[must_use]
pub fn filter_hotspots_by_risk_level(hotspots: &[Hotspot], level: RiskLevel) -> Vec<Hotspot> {
    hotspots
        .iter()
        .filter(|h| h.risk_level == level)
        .cloned()
        .collect()
}
