//! Row-major grids and their masked counterparts.
//!
//! `Grid<T>` is a plain 2-D array with no notion of missing data.
//! `MaskedGrid<T>` pairs every value with an explicit validity flag; invalid
//! cells never take part in arithmetic and every elementwise operation
//! propagates invalidity.
use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};

/// A 2-D grid stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    /// Row-major cell values, length `width × height`.
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// Vegetation-index observations for one period.
pub type IndexGrid = Grid<f64>;
/// Zone identifiers, with the nodata sentinel marking excluded cells.
pub type ZoneGrid = Grid<i32>;
/// Discrete classification codes, nodata sentinel on invalid cells.
pub type ClassificationGrid = Grid<i32>;

impl<T: Copy> Grid<T> {
    /// Create a grid filled with the given value.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self { data: vec![fill; width * height], width, height }
    }

    /// Build a grid from row lists. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(IndicatorError::RaggedRow { row: r, expected: width, found: row.len() });
            }
            data.extend(row);
        }
        Ok(Self { data, width, height })
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        let grid = Self { data, width, height };
        grid.check_len()?;
        Ok(grid)
    }

    /// Fails unless the buffer holds exactly `width × height` cells.
    ///
    /// Grids built through `from_rows`/`from_vec` always pass; grids that
    /// arrive through serde or a struct literal may not.
    pub fn check_len(&self) -> Result<()> {
        let expected = self.width * self.height;
        if self.data.len() != expected {
            return Err(IndicatorError::BufferLength { expected, found: self.data.len() });
        }
        Ok(())
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: T) {
        self.data[row * self.width + col] = val;
    }

    /// `(row, col)` of a flat index.
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.width.max(1), idx % self.width.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.data.chunks(self.width).map(<[T]>::to_vec).collect()
    }
}

impl<T: Copy + PartialEq> Grid<T> {
    /// Treat cells equal to `nodata` as invalid.
    pub fn mask_nodata(&self, nodata: T) -> MaskedGrid<T> {
        MaskedGrid {
            valid: self.data.iter().map(|&v| v != nodata).collect(),
            values: self.data.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// A grid of `(value, valid)` pairs.
///
/// The value of an invalid cell is unspecified and must not be read as data;
/// accessors return `None` for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskedGrid<T> {
    pub values: Vec<T>,
    pub valid: Vec<bool>,
    pub width: usize,
    pub height: usize,
}

impl<T: Copy> MaskedGrid<T> {
    /// A grid where every cell is invalid.
    pub fn all_invalid(width: usize, height: usize, placeholder: T) -> Self {
        Self { values: vec![placeholder; width * height], valid: vec![false; width * height], width, height }
    }

    /// Pair a plain grid with an externally computed mask.
    pub fn with_mask(grid: Grid<T>, valid: Vec<bool>) -> Result<Self> {
        if valid.len() != grid.data.len() {
            return Err(IndicatorError::BufferLength { expected: grid.data.len(), found: valid.len() });
        }
        Ok(Self { values: grid.data, valid, width: grid.width, height: grid.height })
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Fails unless both `values` and `valid` hold `width × height` cells.
    pub fn check_len(&self) -> Result<()> {
        let expected = self.width * self.height;
        for found in [self.values.len(), self.valid.len()] {
            if found != expected {
                return Err(IndicatorError::BufferLength { expected, found });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.get_flat(row * self.width + col)
    }

    #[inline]
    pub fn get_flat(&self, idx: usize) -> Option<T> {
        if self.valid[idx] {
            Some(self.values[idx])
        } else {
            None
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Flat indices and values of the valid cells, in row-major order.
    pub fn iter_valid(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.values
            .iter()
            .zip(&self.valid)
            .enumerate()
            .filter_map(|(i, (&v, &ok))| ok.then_some((i, v)))
    }

    /// Elementwise map over valid cells; invalid cells stay invalid.
    pub fn map_valid<U: Copy>(&self, placeholder: U, f: impl Fn(T) -> U) -> MaskedGrid<U> {
        MaskedGrid {
            values: self
                .values
                .iter()
                .zip(&self.valid)
                .map(|(&v, &ok)| if ok { f(v) } else { placeholder })
                .collect(),
            valid: self.valid.clone(),
            width: self.width,
            height: self.height,
        }
    }

    /// Elementwise combination of two masked grids of identical shape.
    /// A result cell is valid only when both inputs are valid there and `f`
    /// returns `Some`.
    pub fn zip_with<U: Copy, V: Copy>(
        &self,
        other: &MaskedGrid<U>,
        placeholder: V,
        f: impl Fn(T, U) -> Option<V>,
    ) -> Result<MaskedGrid<V>> {
        if self.shape() != other.shape() {
            return Err(IndicatorError::ShapeMismatch {
                grid: "masked operand".into(),
                expected: self.shape(),
                found: other.shape(),
            });
        }
        self.check_len()?;
        other.check_len()?;
        let n = self.values.len();
        let mut values = Vec::with_capacity(n);
        let mut valid = Vec::with_capacity(n);
        for i in 0..n {
            match (self.get_flat(i), other.get_flat(i)) {
                (Some(a), Some(b)) => match f(a, b) {
                    Some(out) => {
                        values.push(out);
                        valid.push(true);
                    }
                    None => {
                        values.push(placeholder);
                        valid.push(false);
                    }
                },
                _ => {
                    values.push(placeholder);
                    valid.push(false);
                }
            }
        }
        Ok(MaskedGrid { values, valid, width: self.width, height: self.height })
    }

    /// Materialise as a plain grid, writing `fill` into invalid cells.
    pub fn filled(&self, fill: T) -> Grid<T> {
        Grid {
            data: self.values.iter().zip(&self.valid).map(|(&v, &ok)| if ok { v } else { fill }).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Row lists with `None` for invalid cells.
    pub fn to_option_rows(&self) -> Vec<Vec<Option<T>>> {
        (0..self.height)
            .map(|r| (0..self.width).map(|c| self.get(r, c)).collect())
            .collect()
    }
}
