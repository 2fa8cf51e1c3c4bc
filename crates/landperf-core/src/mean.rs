//! Per-pixel mean of an index stack.
//!
//! The reduction is elementwise and ignores the zone grid entirely: validity
//! of the mean is decided later from the zones. Each cell sums its k period
//! values in stack order and divides by k, so the result is reproducible bit
//! for bit.
use crate::error::{IndicatorError, Result};
use crate::grid::{Grid, IndexGrid};
use crate::maybe_rayon::*;

/// Check that the stack is non-empty, every buffer matches its declared
/// shape, and every grid shares the first one's shape. Returns that shape.
pub fn stack_shape(stack: &[IndexGrid]) -> Result<(usize, usize)> {
    let first = stack.first().ok_or(IndicatorError::EmptyStack)?;
    let shape = first.shape();
    for (i, g) in stack.iter().enumerate() {
        g.check_len()?;
        if g.shape() != shape {
            return Err(IndicatorError::ShapeMismatch {
                grid: format!("index grid {i}"),
                expected: shape,
                found: g.shape(),
            });
        }
    }
    Ok(shape)
}

/// Arithmetic mean across the stack at every cell.
pub fn mean_index(stack: &[IndexGrid]) -> Result<IndexGrid> {
    let (height, width) = stack_shape(stack)?;
    let k = stack.len() as f64;
    let data: Vec<f64> = (0..width * height)
        .into_par_iter()
        .map(|i| stack.iter().map(|g| g.data[i]).sum::<f64>() / k)
        .collect();
    Ok(Grid { data, width, height })
}

/// Cells where no period carries `index_nodata`.
///
/// Only used when index-level masking is switched on in the configuration;
/// by default the mean grid inherits its mask from the zone grid alone.
pub fn index_validity(stack: &[IndexGrid], index_nodata: f64) -> Result<Vec<bool>> {
    let (height, width) = stack_shape(stack)?;
    Ok((0..width * height)
        .into_par_iter()
        .map(|i| stack.iter().all(|g| g.data[i] != index_nodata))
        .collect())
}
