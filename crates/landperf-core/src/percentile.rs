//! Percentile by linear interpolation between closest ranks.
//!
//! For n sorted values and rank p ∈ [0, 100]:
//!   h = p/100 · (n − 1)
//!   result = x[⌊h⌋] + (h − ⌊h⌋) · (x[⌊h⌋ + 1] − x[⌊h⌋])
//!
//! The interpolation is evaluated from the nearer order statistic (the upper
//! one once the fraction reaches one half), which keeps results identical to
//! the reference fixtures the engine is checked against.

/// Percentile of an ascending slice. Returns `None` for an empty slice and
/// NaN if any value is NaN.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if sorted.iter().any(|v| v.is_nan()) {
        return Some(f64::NAN);
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let h = (p / 100.0) * (n - 1) as f64;
    let lo = (h.floor() as usize).min(n - 1);
    let hi = (lo + 1).min(n - 1);
    let t = h - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    Some(lerp(a, b, t))
}

/// Sort `values` in place and take the p-th percentile.
pub fn percentile(values: &mut [f64], p: f64) -> Option<f64> {
    values.sort_by(f64::total_cmp);
    percentile_sorted(values, p)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if a == b {
        return a;
    }
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn singleton_returns_its_value_unchanged() {
        for p in [0.0, 37.5, 90.0, 100.0] {
            assert_eq!(percentile(&mut [253.5], p), Some(253.5));
        }
    }

    #[test]
    fn two_values_interpolate_linearly() {
        assert_relative_eq!(percentile(&mut [54.5, 6.5], 90.0).unwrap(), 49.7, epsilon = 1e-12);
        assert_relative_eq!(percentile(&mut [6.0, 5.5], 90.0).unwrap(), 5.95, epsilon = 1e-12);
    }

    #[test]
    fn integer_rank_hits_order_statistic() {
        let mut v = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&mut v, 0.0), Some(1.0));
        assert_eq!(percentile(&mut v, 50.0), Some(3.0));
        assert_eq!(percentile(&mut v, 75.0), Some(4.0));
        assert_eq!(percentile(&mut v, 100.0), Some(5.0));
    }

    #[test]
    fn fractional_rank_below_half_interpolates_from_lower() {
        // h = 0.9 · 3 = 2.7 → 30 + 0.7 · 10
        let mut v = [10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(percentile(&mut v, 90.0).unwrap(), 37.0, epsilon = 1e-12);
        // h = 0.1 · 3 = 0.3 → 10 + 0.3 · 10
        assert_relative_eq!(percentile(&mut v, 10.0).unwrap(), 13.0, epsilon = 1e-12);
    }

    #[test]
    fn ties_are_returned_exactly() {
        assert_eq!(percentile(&mut [0.3, 0.3, 0.3], 90.0), Some(0.3));
    }

    #[test]
    fn empty_input_has_no_percentile() {
        assert_eq!(percentile(&mut [], 90.0), None);
    }

    #[test]
    fn nan_poisons_the_result() {
        assert!(percentile(&mut [1.0, f64::NAN], 50.0).unwrap().is_nan());
    }
}
