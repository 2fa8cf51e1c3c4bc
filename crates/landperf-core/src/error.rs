use thiserror::Error;

/// Fatal errors raised by the indicator engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("shape mismatch for {grid}: expected {expected:?} (rows, cols), got {found:?}")]
    ShapeMismatch {
        grid: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("index stack is empty")]
    EmptyStack,

    #[error("index stack has {found} periods, at least {required} required")]
    InsufficientPeriods { required: usize, found: usize },

    /// A zone counted by the frequency stage yielded no values in the
    /// reference stage. Always a logic bug.
    #[error("zone {zone} has no valid cells to compute a reference from")]
    EmptyZone { zone: i32 },

    #[error("invalid configuration: {field} ({reason})")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("buffer holds {found} cells, grid needs {expected}")]
    BufferLength { expected: usize, found: usize },
}

/// Conditions that do not stop the computation but are reported alongside
/// the result.
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum IndicatorWarning {
    /// The zone's reference value is exactly zero; its cells are nodata in
    /// the ratio and classification outputs.
    #[error("zone {zone} has a zero reference value; {cells} cells left unclassified (first at {first_cell:?})")]
    DivisionByZeroReference {
        zone: i32,
        cells: usize,
        first_cell: (usize, usize),
    },

    /// The zone's reference value is NaN or infinite, usually because a
    /// non-finite index value reached the percentile. Its cells are nodata in
    /// the ratio and classification outputs.
    #[error("zone {zone} has a non-finite reference value; {cells} cells left unclassified (first at {first_cell:?})")]
    NonFiniteReference {
        zone: i32,
        cells: usize,
        first_cell: (usize, usize),
    },

    /// The zone grid holds nothing but nodata; every output cell is nodata.
    #[error("zone grid contains no valid zones")]
    NoValidZones,
}

pub type Result<T> = std::result::Result<T, IndicatorError>;
