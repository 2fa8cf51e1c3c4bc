//! Per-call configuration of the indicator.
//!
//! Everything the engine needs beyond the grids themselves travels in an
//! [`IndicatorConfig`] value. Defaults reproduce the binary performance
//! mapping: a ratio of at least 0.5 is stable (code 0), anything below is
//! potential degradation (code 2).
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::change::ChangeMatrix;
use crate::error::{IndicatorError, Result};

/// Default nodata sentinel for zone and classification grids.
pub const DEFAULT_NODATA: i32 = -32768;
/// Default percentile rank for zone references.
pub const DEFAULT_PERCENTILE: f64 = 90.0;
/// Ratio at or above which a pixel counts as stable by default.
pub const DEFAULT_DEGRADED_CUTOFF: f64 = 0.5;

pub const CODE_STABLE: i32 = 0;
pub const CODE_DEGRADED: i32 = 2;

/// One class boundary: a ratio `>= min_ratio` that did not reach an earlier
/// cutoff receives `code`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cutoff {
    pub min_ratio: f64,
    pub code: i32,
}

/// Ordered classification thresholds.
///
/// `cutoffs` run from the highest `min_ratio` down. A ratio takes the code of
/// the first cutoff it reaches; ratios below every cutoff get `floor_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub cutoffs: Vec<Cutoff>,
    pub floor_code: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cutoffs: vec![Cutoff { min_ratio: DEFAULT_DEGRADED_CUTOFF, code: CODE_STABLE }],
            floor_code: CODE_DEGRADED,
        }
    }
}

impl Thresholds {
    /// Class code for a finite ratio.
    #[inline]
    pub fn classify(&self, ratio: f64) -> i32 {
        self.cutoffs
            .iter()
            .find(|c| ratio >= c.min_ratio)
            .map_or(self.floor_code, |c| c.code)
    }

    /// Every code this scheme can emit, highest class first.
    pub fn codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.cutoffs.iter().map(|c| c.code).chain(std::iter::once(self.floor_code))
    }

    fn validate(&self, nodata: i32) -> Result<()> {
        for pair in self.cutoffs.windows(2) {
            if pair[0].min_ratio <= pair[1].min_ratio {
                return Err(IndicatorError::InvalidConfig {
                    field: "thresholds.cutoffs",
                    reason: format!(
                        "min_ratio must strictly decrease, found {} then {}",
                        pair[0].min_ratio, pair[1].min_ratio
                    ),
                });
            }
        }
        if let Some(c) = self.cutoffs.iter().find(|c| !c.min_ratio.is_finite()) {
            return Err(IndicatorError::InvalidConfig {
                field: "thresholds.cutoffs",
                reason: format!("min_ratio {} is not finite", c.min_ratio),
            });
        }
        if self.codes().any(|code| code == nodata) {
            return Err(IndicatorError::InvalidConfig {
                field: "thresholds",
                reason: format!("class code collides with nodata sentinel {nodata}"),
            });
        }
        Ok(())
    }
}

/// Parameters of one indicator computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Sentinel marking excluded cells in the zone grid and in every
    /// integer output.
    pub nodata: i32,
    /// Percentile rank (0–100) used for zone references.
    pub percentile: f64,
    pub thresholds: Thresholds,
    /// Minimum number of periods in the index stack.
    pub min_periods: usize,
    /// When set, a cell carrying this value in any period is excluded from
    /// every output. Off by default: validity comes from the zone grid only.
    pub index_nodata: Option<f64>,
    /// Baseline/reporting code pairs for [`crate::change::combine`].
    pub change_matrix: ChangeMatrix,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            nodata: DEFAULT_NODATA,
            percentile: DEFAULT_PERCENTILE,
            thresholds: Thresholds::default(),
            min_periods: 1,
            index_nodata: None,
            change_matrix: ChangeMatrix::default(),
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.percentile.is_finite() || !(0.0..=100.0).contains(&self.percentile) {
            return Err(IndicatorError::InvalidConfig {
                field: "percentile",
                reason: format!("{} is outside [0, 100]", self.percentile),
            });
        }
        if self.min_periods == 0 {
            return Err(IndicatorError::InvalidConfig {
                field: "min_periods",
                reason: "must be at least 1".into(),
            });
        }
        self.thresholds.validate(self.nodata)?;
        self.change_matrix.validate(self.nodata)
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| IndicatorError::InvalidConfig {
            field: "json",
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| IndicatorError::InvalidConfig {
            field: "path",
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_binary_mapping() {
        let cfg = IndicatorConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.thresholds.classify(1.0), CODE_STABLE);
        assert_eq!(cfg.thresholds.classify(0.5), CODE_STABLE);
        assert_eq!(cfg.thresholds.classify(0.4999), CODE_DEGRADED);
        assert_eq!(cfg.thresholds.codes().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn multi_class_thresholds_pick_first_reached_cutoff() {
        let t = Thresholds {
            cutoffs: vec![
                Cutoff { min_ratio: 0.9, code: 0 },
                Cutoff { min_ratio: 0.7, code: 1 },
                Cutoff { min_ratio: 0.5, code: 2 },
            ],
            floor_code: 3,
        };
        assert_eq!(t.classify(1.2), 0);
        assert_eq!(t.classify(0.75), 1);
        assert_eq!(t.classify(0.5), 2);
        assert_eq!(t.classify(0.1), 3);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = IndicatorConfig::from_json_str(r#"{ "percentile": 75.0 }"#).unwrap();
        assert_eq!(cfg.percentile, 75.0);
        assert_eq!(cfg.nodata, DEFAULT_NODATA);
        assert_eq!(cfg.thresholds, Thresholds::default());
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let cfg = IndicatorConfig { index_nodata: Some(-9999.0), min_periods: 16, ..Default::default() };
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(IndicatorConfig::from_json_str(&text).unwrap(), cfg);
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        for p in [-1.0, 100.5, f64::NAN] {
            let cfg = IndicatorConfig { percentile: p, ..Default::default() };
            assert!(matches!(cfg.validate(), Err(IndicatorError::InvalidConfig { field: "percentile", .. })));
        }
    }

    #[test]
    fn unsorted_cutoffs_are_rejected() {
        let cfg = IndicatorConfig {
            thresholds: Thresholds {
                cutoffs: vec![Cutoff { min_ratio: 0.5, code: 0 }, Cutoff { min_ratio: 0.8, code: 1 }],
                floor_code: 2,
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn code_equal_to_nodata_is_rejected() {
        let cfg = IndicatorConfig { nodata: 2, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(IndicatorError::InvalidConfig { field: "thresholds", .. })));
    }

    #[test]
    fn change_matrix_loads_from_json() {
        let cfg = IndicatorConfig::from_json_str(
            r#"{ "change_matrix": [{ "base": 0, "curr": 2, "mapping": 1 }] }"#,
        )
        .unwrap();
        assert_eq!(cfg.change_matrix.lookup(0, 2), Some(1));
        assert_eq!(cfg.change_matrix.lookup(2, 2), None);
        assert_eq!(IndicatorConfig::default().change_matrix.lookup(2, 0), Some(CODE_STABLE));
    }

    #[test]
    fn zero_min_periods_is_rejected() {
        let cfg = IndicatorConfig { min_periods: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            IndicatorConfig::from_json_str("{ percentile: }"),
            Err(IndicatorError::InvalidConfig { field: "json", .. })
        ));
    }
}
