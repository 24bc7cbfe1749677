use crate::data::Column;
use ndarray::{Array1, ArrayView1};

/// Trailing arithmetic mean. Undefined for the first `window - 1` cells and
/// for any window containing an undefined cell.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| w.mean())
}

/// Trailing sample standard deviation (ddof = 1). A window of one
/// observation has no sample deviation, so every cell is undefined.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| (w.len() > 1).then(|| w.std(1.0)))
}

fn rolling<F>(values: &[Option<f64>], window: usize, stat: F) -> Column
where
    F: Fn(ArrayView1<f64>) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for end in window - 1..values.len() {
        let cells = &values[end + 1 - window..=end];
        let defined: Option<Vec<f64>> = cells.iter().copied().collect();
        out[end] = defined.and_then(|w| stat(Array1::from(w).view()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn defined(values: &[f64]) -> Column {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_rolling_mean_leading_undefined() {
        let values = defined(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mean = rolling_mean(&values, 3);

        assert_eq!(mean[0], None);
        assert_eq!(mean[1], None);
        assert_relative_eq!(mean[2].unwrap(), 2.0);
        assert_relative_eq!(mean[3].unwrap(), 3.0);
        assert_relative_eq!(mean[4].unwrap(), 4.0);
    }

    #[test]
    fn test_rolling_mean_gap_poisons_window() {
        let values = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let mean = rolling_mean(&values, 2);
        assert_eq!(mean[1], None);
        assert_eq!(mean[2], None);
        assert_relative_eq!(mean[3].unwrap(), 3.5);
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let values = defined(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let std = rolling_std(&values, 8);
        assert!(std[..7].iter().all(Option::is_none));
        // Sample variance of this set is 32 / 7.
        assert_relative_eq!(std[7].unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_window_one() {
        let values = defined(&[1.0, 2.0]);
        assert_eq!(rolling_mean(&values, 1), values);
        assert_eq!(rolling_std(&values, 1), vec![None, None]);
    }

    #[test]
    fn test_window_longer_than_series() {
        let values = defined(&[1.0, 2.0]);
        assert_eq!(rolling_mean(&values, 5), vec![None, None]);
    }
}
