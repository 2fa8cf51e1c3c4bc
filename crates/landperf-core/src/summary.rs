//! Per-zone tallies of an indicator result, for reporting.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};
use crate::grid::ZoneGrid;
use crate::indicator::IndicatorResult;

/// Class code → number of cells.
pub type ClassCounts = BTreeMap<i32, usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub zone: i32,
    /// Cells counted for the zone by the frequency stage.
    pub cells: usize,
    pub reference: Option<f64>,
    /// Cells per class code. Cells of the zone left unclassified are counted
    /// under the nodata sentinel.
    pub classes: ClassCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub zones: Vec<ZoneSummary>,
    /// Class counts over the whole grid, nodata cells included.
    pub totals: ClassCounts,
}

/// Tally classification codes per zone and over the whole grid.
///
/// `zones` is the zone grid the result was computed from. A cell counts
/// toward its zone only where the result's mean index is valid, so cells
/// excluded through `index_nodata` land in `totals` alone and every zone's
/// `cells` equals the sum of its `classes`.
pub fn summarize(result: &IndicatorResult, zones: &ZoneGrid) -> Result<IndicatorSummary> {
    if zones.shape() != result.classification.shape() {
        return Err(IndicatorError::ShapeMismatch {
            grid: "zone grid".into(),
            expected: result.classification.shape(),
            found: zones.shape(),
        });
    }
    zones.check_len()?;
    result.classification.check_len()?;
    result.mean_index.check_len()?;

    let mut per_zone: BTreeMap<i32, ClassCounts> =
        result.frequencies.zones().map(|z| (z, ClassCounts::new())).collect();
    let mut totals = ClassCounts::new();

    let cells = result.classification.data.iter().zip(&zones.data).zip(&result.mean_index.valid);
    for ((&code, &zone), &counted) in cells {
        *totals.entry(code).or_insert(0) += 1;
        if zone == result.nodata || !counted {
            continue;
        }
        if let Some(counts) = per_zone.get_mut(&zone) {
            *counts.entry(code).or_insert(0) += 1;
        }
    }

    let zones = per_zone
        .into_iter()
        .map(|(zone, classes)| ZoneSummary {
            zone,
            cells: result.frequencies.get(zone).unwrap_or(0),
            reference: result.references.get(zone),
            classes,
        })
        .collect();

    Ok(IndicatorSummary { zones, totals })
}
