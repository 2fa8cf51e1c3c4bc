//! Per-zone reference values.
//!
//! Every valid zone's reference is a percentile of the mean index over the
//! zone's cells. Values are grouped once per call into an ordered map of
//! zone id → values, reduced independently per zone, and the grouping is
//! dropped afterwards.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IndicatorError, Result};
use crate::frequency::FrequencyTable;
use crate::grid::{IndexGrid, MaskedGrid, ZoneGrid};
use crate::maybe_rayon::*;
use crate::percentile::percentile;

/// Zone id → reference value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZonalReferenceTable(BTreeMap<i32, f64>);

impl ZonalReferenceTable {
    #[inline]
    pub fn get(&self, zone: i32) -> Option<f64> {
        self.0.get(&zone).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(&z, &v)| (z, v))
    }

    /// Paint each zone's reference back onto its cells. Cells whose zone is
    /// nodata or missing from the table are invalid.
    pub fn to_grid(&self, zones: &ZoneGrid, nodata: i32) -> MaskedGrid<f64> {
        let mut values = Vec::with_capacity(zones.len());
        let mut valid = Vec::with_capacity(zones.len());
        for &z in &zones.data {
            match (z != nodata).then(|| self.get(z)).flatten() {
                Some(r) => {
                    values.push(r);
                    valid.push(true);
                }
                None => {
                    values.push(0.0);
                    valid.push(false);
                }
            }
        }
        MaskedGrid { values, valid, width: zones.width, height: zones.height }
    }
}

impl FromIterator<(i32, f64)> for ZonalReferenceTable {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compute the `rank`-th percentile of `mean` over each zone listed in
/// `frequencies`.
///
/// `mean` and `zones` must share a shape. A zone present in `frequencies`
/// that collects no values fails with [`IndicatorError::EmptyZone`]; this
/// only happens when the table was built from a different grid or sentinel.
pub fn zonal_references(
    mean: &IndexGrid,
    zones: &ZoneGrid,
    nodata: i32,
    rank: f64,
    frequencies: &FrequencyTable,
) -> Result<ZonalReferenceTable> {
    if mean.shape() != zones.shape() {
        return Err(IndicatorError::ShapeMismatch {
            grid: "mean index grid".into(),
            expected: zones.shape(),
            found: mean.shape(),
        });
    }
    mean.check_len()?;
    zones.check_len()?;

    let mut groups: BTreeMap<i32, Vec<f64>> = frequencies
        .iter()
        .map(|(z, n)| (z, Vec::with_capacity(n)))
        .collect();
    for (&z, &v) in zones.data.iter().zip(&mean.data) {
        if z == nodata {
            continue;
        }
        if let Some(values) = groups.get_mut(&z) {
            values.push(v);
        }
    }

    let reduced: Vec<(i32, Option<f64>)> = groups
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(z, mut values)| (z, percentile(&mut values, rank)))
        .collect();

    let mut table = BTreeMap::new();
    for (zone, reference) in reduced {
        let reference = reference.ok_or(IndicatorError::EmptyZone { zone })?;
        debug!(zone, reference, "zone reference");
        table.insert(zone, reference);
    }
    Ok(ZonalReferenceTable(table))
}
