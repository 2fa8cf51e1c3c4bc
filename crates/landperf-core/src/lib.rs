//! Zonal land-degradation indicator engine.
//!
//! Given a stack of co-registered vegetation-index grids and a zone grid, the
//! engine computes a per-pixel mean index, a percentile reference value per
//! zone, the ratio of each pixel to its zone reference, and a discrete
//! classification of that ratio.
//!
//! Pipeline:
//!   frequency distribution → mean index → zone references →
//!   ratios → classification
//!
//! Two classifications of the same area, a baseline and a reporting period,
//! can then be combined cell by cell through a [`change::ChangeMatrix`].
//!
//! Everything is a pure function of its inputs; see
//! [`indicator::IndicatorEngine`] for the entry point.
pub mod change;
pub mod classify;
pub mod config;
pub mod error;
pub mod frequency;
pub mod grid;
pub mod indicator;
mod maybe_rayon;
pub mod mean;
pub mod percentile;
pub mod reference;
pub mod summary;

pub use change::{combine, ChangeMatrix, ChangeRule};
pub use config::{Cutoff, IndicatorConfig, Thresholds, DEFAULT_NODATA};
pub use error::{IndicatorError, IndicatorWarning, Result};
pub use frequency::FrequencyTable;
pub use grid::{ClassificationGrid, Grid, IndexGrid, MaskedGrid, ZoneGrid};
pub use indicator::{compute_indicator, IndicatorEngine, IndicatorResult};
pub use reference::ZonalReferenceTable;
pub use summary::{summarize, IndicatorSummary, ZoneSummary};
