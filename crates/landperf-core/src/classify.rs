//! Ratio of mean index to zone reference, and its classification.
use std::collections::BTreeMap;

use tracing::warn;

use crate::config::Thresholds;
use crate::error::{IndicatorError, IndicatorWarning, Result};
use crate::grid::{ClassificationGrid, MaskedGrid, ZoneGrid};
use crate::reference::ZonalReferenceTable;

/// Ratio grid together with the zones that could not be divided through.
#[derive(Debug, Clone)]
pub struct RatioOutput {
    pub ratios: MaskedGrid<f64>,
    pub warnings: Vec<IndicatorWarning>,
}

/// `mean / reference[zone]` for every cell that is valid in `mean`.
///
/// `mean` must already carry the zone mask. Cells of a zone whose reference
/// is exactly zero are left invalid and the zone is reported once as
/// [`IndicatorWarning::DivisionByZeroReference`]; a NaN or infinite
/// reference is handled the same way and reported as
/// [`IndicatorWarning::NonFiniteReference`]. A ratio that comes out NaN
/// or infinite is left invalid as well. A valid cell whose zone has no
/// reference at all is a logic error ([`IndicatorError::EmptyZone`]).
pub fn ratio_grid(
    mean: &MaskedGrid<f64>,
    zones: &ZoneGrid,
    references: &ZonalReferenceTable,
) -> Result<RatioOutput> {
    if mean.shape() != zones.shape() {
        return Err(IndicatorError::ShapeMismatch {
            grid: "mean index grid".into(),
            expected: zones.shape(),
            found: mean.shape(),
        });
    }

    mean.check_len()?;
    zones.check_len()?;

    let mut ratios = MaskedGrid::all_invalid(mean.width, mean.height, 0.0);
    // zone → (cells skipped, first skipped flat index)
    let mut zero_zones: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
    let mut non_finite_zones: BTreeMap<i32, (usize, usize)> = BTreeMap::new();

    for (idx, m) in mean.iter_valid() {
        let zone = zones.data[idx];
        let reference = references.get(zone).ok_or(IndicatorError::EmptyZone { zone })?;
        if reference == 0.0 {
            zero_zones.entry(zone).or_insert((0, idx)).0 += 1;
            continue;
        }
        if !reference.is_finite() {
            non_finite_zones.entry(zone).or_insert((0, idx)).0 += 1;
            continue;
        }
        let ratio = m / reference;
        if ratio.is_finite() {
            ratios.values[idx] = ratio;
            ratios.valid[idx] = true;
        }
    }

    let zero = zero_zones.into_iter().map(|(zone, (cells, first))| {
        let first_cell = zones.coords(first);
        warn!(zone, cells, ?first_cell, "zero reference value, zone left unclassified");
        IndicatorWarning::DivisionByZeroReference { zone, cells, first_cell }
    });
    let non_finite = non_finite_zones.into_iter().map(|(zone, (cells, first))| {
        let first_cell = zones.coords(first);
        warn!(zone, cells, ?first_cell, "non-finite reference value, zone left unclassified");
        IndicatorWarning::NonFiniteReference { zone, cells, first_cell }
    });
    let warnings = zero.chain(non_finite).collect();

    Ok(RatioOutput { ratios, warnings })
}

/// Map every valid ratio to its class code; invalid cells carry `nodata`.
pub fn classify(ratios: &MaskedGrid<f64>, thresholds: &Thresholds, nodata: i32) -> ClassificationGrid {
    ratios.map_valid(nodata, |r| thresholds.classify(r)).filled(nodata)
}
