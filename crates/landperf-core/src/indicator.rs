//! Indicator orchestrator: runs every stage in order and returns the full
//! bundle of intermediate artifacts.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::change::combine;
use crate::classify::{classify, ratio_grid, RatioOutput};
use crate::config::{IndicatorConfig, Thresholds};
use crate::error::{IndicatorError, IndicatorWarning, Result};
use crate::frequency::{frequency_distribution, FrequencyTable};
use crate::grid::{ClassificationGrid, IndexGrid, MaskedGrid, ZoneGrid};
use crate::mean::{index_validity, mean_index, stack_shape};
use crate::reference::{zonal_references, ZonalReferenceTable};

/// Everything one indicator computation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    /// Class code per cell; `nodata` where the cell could not be classified.
    pub classification: ClassificationGrid,
    /// Per-pixel mean of the index stack, masked by the zone grid.
    pub mean_index: MaskedGrid<f64>,
    /// Mean index divided by the cell's zone reference.
    pub ratios: MaskedGrid<f64>,
    /// Each cell's zone reference painted onto the grid.
    pub reference_grid: MaskedGrid<f64>,
    pub references: ZonalReferenceTable,
    pub frequencies: FrequencyTable,
    /// Non-fatal conditions met along the way.
    pub warnings: Vec<IndicatorWarning>,
    /// Sentinel written into `classification`.
    pub nodata: i32,
}

/// Runs the indicator pipeline with a fixed, validated configuration.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Run the full pipeline on one index stack and zone grid.
    ///
    /// Pipeline order:
    ///   1. Shape validation (fails before any computation)
    ///   2. Frequency distribution of the zone grid
    ///   3. Per-pixel mean of the stack
    ///   4. Zone references
    ///   5. Ratios and classification
    ///
    /// An all-nodata zone grid is not an error: the result has empty tables,
    /// every cell is nodata, and `warnings` holds
    /// [`IndicatorWarning::NoValidZones`].
    pub fn compute(&self, stack: &[IndexGrid], zones: &ZoneGrid) -> Result<IndicatorResult> {
        let cfg = &self.config;
        let nodata = cfg.nodata;

        // ── 1. Validation ──────────────────────────────────────────────────
        let shape = stack_shape(stack)?;
        if stack.len() < cfg.min_periods {
            return Err(IndicatorError::InsufficientPeriods { required: cfg.min_periods, found: stack.len() });
        }
        zones.check_len()?;
        if zones.shape() != shape {
            return Err(IndicatorError::ShapeMismatch {
                grid: "zone grid".into(),
                expected: shape,
                found: zones.shape(),
            });
        }

        // Index-level masking folds into the zone grid so that every later
        // stage sees a single source of validity.
        let zones: Cow<'_, ZoneGrid> = match cfg.index_nodata {
            Some(sentinel) => {
                let keep = index_validity(stack, sentinel)?;
                let mut masked = zones.clone();
                for (z, ok) in masked.data.iter_mut().zip(keep) {
                    if !ok {
                        *z = nodata;
                    }
                }
                Cow::Owned(masked)
            }
            None => Cow::Borrowed(zones),
        };

        // ── 2. Frequency distribution ──────────────────────────────────────
        let frequencies = frequency_distribution(&zones, nodata);
        let mut warnings = Vec::new();
        if frequencies.is_empty() {
            warn!(rows = shape.0, cols = shape.1, "zone grid has no valid cells");
            warnings.push(IndicatorWarning::NoValidZones);
        }
        debug!(zones = frequencies.len(), cells = frequencies.total(), "frequency distribution");

        // ── 3. Mean index ──────────────────────────────────────────────────
        let mean = mean_index(stack)?;
        let zone_mask = zones.mask_nodata(nodata).valid;

        // ── 4. Zone references ─────────────────────────────────────────────
        let references = zonal_references(&mean, &zones, nodata, cfg.percentile, &frequencies)?;
        let reference_grid = references.to_grid(&zones, nodata);
        let mean_index = MaskedGrid::with_mask(mean, zone_mask)?;

        // ── 5. Ratios and classification ───────────────────────────────────
        let RatioOutput { ratios, warnings: ratio_warnings } = ratio_grid(&mean_index, &zones, &references)?;
        warnings.extend(ratio_warnings);
        let classification = classify(&ratios, &cfg.thresholds, nodata);
        debug!(
            periods = stack.len(),
            classified = ratios.valid_count(),
            warnings = warnings.len(),
            "indicator computed"
        );

        Ok(IndicatorResult {
            classification,
            mean_index,
            ratios,
            reference_grid,
            references,
            frequencies,
            warnings,
            nodata,
        })
    }

    /// Combine a baseline and a reporting result through the configured
    /// change matrix. Cells that are nodata in either period, or whose code
    /// pair has no rule, are nodata.
    pub fn change(&self, baseline: &IndicatorResult, reporting: &IndicatorResult) -> Result<ClassificationGrid> {
        combine(&baseline.classification, &reporting.classification, &self.config.change_matrix, self.config.nodata)
    }
}

/// One-shot form of [`IndicatorEngine::compute`] taking the parameters
/// individually. Other configuration fields keep their defaults.
pub fn compute_indicator(
    stack: &[IndexGrid],
    zones: &ZoneGrid,
    nodata: i32,
    percentile: f64,
    thresholds: Thresholds,
) -> Result<IndicatorResult> {
    let config = IndicatorConfig { nodata, percentile, thresholds, ..IndicatorConfig::default() };
    IndicatorEngine::new(config)?.compute(stack, zones)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
