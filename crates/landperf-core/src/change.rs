//! Baseline → reporting change of two classification grids.
//!
//! Each cell's pair of codes `(baseline, reporting)` is looked up in a
//! [`ChangeMatrix`]; the matching rule's `mapping` becomes the output code.
//! Cells whose pair matches no rule, nodata cells included, carry nodata.
use serde::{Deserialize, Serialize};

use crate::config::{CODE_DEGRADED, CODE_STABLE};
use crate::error::{IndicatorError, Result};
use crate::grid::{ClassificationGrid, Grid};

/// One row of the change matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRule {
    /// Code in the baseline classification.
    pub base: i32,
    /// Code in the reporting classification.
    pub curr: i32,
    pub mapping: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeMatrix(pub Vec<ChangeRule>);

impl Default for ChangeMatrix {
    /// Degradation in the reporting period wins; otherwise stable.
    fn default() -> Self {
        Self(vec![
            ChangeRule { base: CODE_DEGRADED, curr: CODE_DEGRADED, mapping: CODE_DEGRADED },
            ChangeRule { base: CODE_STABLE, curr: CODE_DEGRADED, mapping: CODE_DEGRADED },
            ChangeRule { base: CODE_DEGRADED, curr: CODE_STABLE, mapping: CODE_STABLE },
            ChangeRule { base: CODE_STABLE, curr: CODE_STABLE, mapping: CODE_STABLE },
        ])
    }
}

impl ChangeMatrix {
    /// Output code for a pair of input codes, if any rule covers it.
    #[inline]
    pub fn lookup(&self, base: i32, curr: i32) -> Option<i32> {
        self.0.iter().find(|r| r.base == base && r.curr == curr).map(|r| r.mapping)
    }

    pub(crate) fn validate(&self, nodata: i32) -> Result<()> {
        for (i, rule) in self.0.iter().enumerate() {
            if [rule.base, rule.curr, rule.mapping].contains(&nodata) {
                return Err(IndicatorError::InvalidConfig {
                    field: "change_matrix",
                    reason: format!("rule {i} uses the nodata sentinel {nodata}"),
                });
            }
            if self.0[..i].iter().any(|r| r.base == rule.base && r.curr == rule.curr) {
                return Err(IndicatorError::InvalidConfig {
                    field: "change_matrix",
                    reason: format!("rule {i} repeats the pair ({}, {})", rule.base, rule.curr),
                });
            }
        }
        Ok(())
    }
}

/// Combine a baseline and a reporting classification cell by cell.
pub fn combine(
    baseline: &ClassificationGrid,
    reporting: &ClassificationGrid,
    matrix: &ChangeMatrix,
    nodata: i32,
) -> Result<ClassificationGrid> {
    baseline.check_len()?;
    reporting.check_len()?;
    if baseline.shape() != reporting.shape() {
        return Err(IndicatorError::ShapeMismatch {
            grid: "reporting classification".into(),
            expected: baseline.shape(),
            found: reporting.shape(),
        });
    }
    let data = baseline
        .data
        .iter()
        .zip(&reporting.data)
        .map(|(&b, &c)| matrix.lookup(b, c).unwrap_or(nodata))
        .collect();
    Ok(Grid { data, width: baseline.width, height: baseline.height })
}
