//! Turns aggregated grid cells into classified hotspots.

use std::collections::BTreeMap;

use hotspots_models::{Hotspot, RadiusScale, RiskLevel};

use crate::aggregate::{GridCell, GridCellKey};

/// Classifies cells using the default [`RadiusScale`].
#[must_use]
pub fn classify(cells: BTreeMap<GridCellKey, GridCell>) -> Vec<Hotspot> {
    classify_with(cells, &RadiusScale::default())
}

/// Drops cells below the hotspot threshold and assigns a [`RiskLevel`] to
/// the rest.
///
/// Output is sorted by incident count, highest first. Equal counts keep
/// ascending cell-key order, so the same cells always produce the same
/// sequence.
#[must_use]
pub fn classify_with(
    cells: BTreeMap<GridCellKey, GridCell>,
    radius: &RadiusScale,
) -> Vec<Hotspot> {
    let mut hotspots: Vec<Hotspot> = cells
        .into_values()
        .filter_map(|cell| {
            let risk_level = RiskLevel::from_count(cell.count)?;
            Some(Hotspot {
                id: cell.key.id(),
                latitude: cell.latitude,
                longitude: cell.longitude,
                incident_count: cell.count,
                risk_level,
                radius_meters: radius.radius_for(cell.count),
                area: cell.area,
                report_ids: cell.report_ids,
            })
        })
        .collect();

    hotspots.sort_by(|a, b| b.incident_count.cmp(&a.incident_count));
    hotspots
}
