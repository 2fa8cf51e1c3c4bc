//! Valid-pixel counts per zone.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::ZoneGrid;

/// Zone id → number of valid cells carrying that id.
///
/// Keys are ordered, so iteration (and serialisation) is deterministic
/// regardless of the order cells were visited in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<i32, usize>);

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, zone: i32) -> Option<usize> {
        self.0.get(&zone).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Zone ids in ascending order.
    pub fn zones(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.0.iter().map(|(&z, &n)| (z, n))
    }

    /// Add `other`'s counts into `self`.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (zone, n) in other.iter() {
            *self.0.entry(zone).or_insert(0) += n;
        }
    }

    fn increment(&mut self, zone: i32) {
        *self.0.entry(zone).or_insert(0) += 1;
    }
}

impl FromIterator<(i32, usize)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (i32, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Count the valid cells of each zone, skipping `nodata`.
///
/// A grid with no valid cells yields an empty table.
pub fn frequency_distribution(zones: &ZoneGrid, nodata: i32) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for &z in zones.data.iter().filter(|&&z| z != nodata) {
        table.increment(z);
    }
    table
}

/// Summed frequency distribution over several zone grids.
pub fn frequency_distribution_many<'a>(
    grids: impl IntoIterator<Item = &'a ZoneGrid>,
    nodata: i32,
) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for g in grids {
        table.merge(&frequency_distribution(g, nodata));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    const NODATA: i32 = -32768;

    #[test]
    fn counts_each_zone_once_per_cell() {
        let zones = Grid::from_rows(vec![vec![2, 3], vec![4, 1], vec![2, 4]]).unwrap();
        let table = frequency_distribution(&zones, NODATA);
        assert_eq!(table.zones().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(table.get(1), Some(1));
        assert_eq!(table.get(2), Some(2));
        assert_eq!(table.get(3), Some(1));
        assert_eq!(table.get(4), Some(2));
        assert_eq!(table.total(), 6);
    }

    #[test]
    fn nodata_cells_are_skipped() {
        let zones = Grid::from_rows(vec![vec![2, 3], vec![4, NODATA], vec![2, 4]]).unwrap();
        let table = frequency_distribution(&zones, NODATA);
        assert_eq!(table.zones().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(table.total(), zones.mask_nodata(NODATA).valid_count());
    }

    #[test]
    fn all_nodata_grid_gives_empty_table() {
        let zones = Grid::new(3, 2, NODATA);
        assert!(frequency_distribution(&zones, NODATA).is_empty());
    }

    #[test]
    fn visiting_order_does_not_change_the_table() {
        let zones = Grid::from_rows(vec![vec![5, 1, 5, 7], vec![7, 7, NODATA, 1]]).unwrap();
        let mut reversed = zones.clone();
        reversed.data.reverse();
        assert_eq!(frequency_distribution(&zones, NODATA), frequency_distribution(&reversed, NODATA));
    }

    #[test]
    fn many_grids_sum_their_counts() {
        let a = Grid::from_rows(vec![vec![1, 2]]).unwrap();
        let b = Grid::from_rows(vec![vec![2, NODATA]]).unwrap();
        let table = frequency_distribution_many([&a, &b], NODATA);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(1, 1), (2, 2)]);
    }
}
