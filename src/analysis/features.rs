use super::rolling::{rolling_mean, rolling_std};
use super::{AnalysisError, Result};
use crate::config::AnalysisSettings;
use crate::data::{Column, Field, PriceSeries};
use tracing::{debug, info};

/// `ln(p[t] / p[t-1])`; undefined at t = 0, across gaps, and where the
/// ratio is not finite.
pub fn log_returns(prices: &[Option<f64>]) -> Column {
    pairwise(prices, |prev, cur| (cur / prev).ln())
}

/// `(p[t] - p[t-1]) / p[t-1]`, with the same undefined cells as
/// [`log_returns`].
pub fn simple_returns(prices: &[Option<f64>]) -> Column {
    pairwise(prices, |prev, cur| (cur - prev) / prev)
}

fn pairwise<F>(prices: &[Option<f64>], f: F) -> Column
where
    F: Fn(f64, f64) -> f64,
{
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(prices.windows(2).map(|pair| match (pair[0], pair[1]) {
        (Some(prev), Some(cur)) => Some(f(prev, cur)).filter(|v| v.is_finite()),
        _ => None,
    }));
    out
}

/// Appends return and rolling-risk columns to a cleaned series.
pub struct FeatureDeriver {
    window: usize,
    simple_returns: bool,
}

impl FeatureDeriver {
    pub fn new(window: usize, simple_returns: bool) -> Self {
        Self {
            window,
            simple_returns,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(settings.window, settings.simple_returns)
    }

    pub fn derive(&self, mut series: PriceSeries) -> Result<PriceSeries> {
        if self.window == 0 {
            return Err(AnalysisError::InvalidWindow);
        }

        let close = series.require(Field::Close)?;
        let log_return = log_returns(close);
        let simple_return = self.simple_returns.then(|| simple_returns(close));

        series.insert_column(Field::LogReturn, log_return)?;
        if let Some(simple_return) = simple_return {
            series.insert_column(Field::SimpleReturn, simple_return)?;
        }

        // Single drop pass; the rolling columns below keep their own
        // leading undefined cells.
        let mut required: Vec<Field> = Field::PRICES.to_vec();
        required.extend([Field::LogReturn, Field::SimpleReturn]);
        let dropped = series.drop_undefined(&required);
        debug!("Dropped {} rows with undefined values", dropped);

        let close = series.require(Field::Close)?;
        let mean = rolling_mean(close, self.window);
        let volatility = rolling_std(series.require(Field::LogReturn)?, self.window);
        series.insert_column(Field::RollingMean, mean)?;
        series.insert_column(Field::Volatility, volatility)?;

        info!(
            "Derived features over {} rows ({}-observation window)",
            series.len(),
            self.window
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..closes.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let mut columns = BTreeMap::new();
        columns.insert(Field::Close, closes.iter().copied().map(Some).collect());
        PriceSeries::new(dates, columns).unwrap()
    }

    #[test]
    fn test_constant_growth_has_constant_log_return() {
        let returns = log_returns(&[Some(100.0), Some(105.0), Some(110.25)]);
        assert_eq!(returns[0], None);
        assert_relative_eq!(returns[1].unwrap(), 1.05f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(returns[2].unwrap(), 1.05f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(returns[1].unwrap(), 0.04879, epsilon = 1e-5);
    }

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&[Some(100.0), Some(105.0), None, Some(110.0)]);
        assert_eq!(returns[0], None);
        assert_relative_eq!(returns[1].unwrap(), 0.05, epsilon = 1e-12);
        assert_eq!(returns[2], None);
        assert_eq!(returns[3], None);
    }

    #[test]
    fn test_zero_previous_price_is_undefined() {
        let returns = log_returns(&[Some(0.0), Some(1.0)]);
        assert_eq!(returns, vec![None, None]);
    }

    #[test]
    fn test_derive_drops_exactly_first_row() {
        let derived = FeatureDeriver::new(2, true)
            .derive(series(&[100.0, 105.0, 110.25, 115.0]))
            .unwrap();

        assert_eq!(derived.len(), 3);
        assert_eq!(
            derived.first_date(),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert!(derived.require(Field::LogReturn).unwrap().iter().all(Option::is_some));
        assert!(derived.has(Field::SimpleReturn));
    }

    #[test]
    fn test_rolling_columns_keep_leading_gaps() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let derived = FeatureDeriver::new(20, false)
            .derive(series(&closes))
            .unwrap();

        let mean = derived.require(Field::RollingMean).unwrap();
        let vol = derived.require(Field::Volatility).unwrap();
        assert_eq!(derived.len(), 29);
        assert!(mean[..19].iter().all(Option::is_none));
        assert!(vol[..19].iter().all(Option::is_none));

        // Post-drop closes are 101..=129; index 19 averages 101..=120.
        assert_relative_eq!(mean[19].unwrap(), 110.5, epsilon = 1e-12);
        assert!(vol[19].unwrap() > 0.0);
        assert!(!derived.has(Field::SimpleReturn));
    }

    #[test]
    fn test_missing_close_is_schema_error() {
        let dates = vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()];
        let mut columns = BTreeMap::new();
        columns.insert(Field::Open, vec![Some(1.0)]);
        let series = PriceSeries::new(dates, columns).unwrap();

        let err = FeatureDeriver::new(20, false).derive(series).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Data(DataError::MissingColumn(ref c)) if c == "Close"
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = FeatureDeriver::new(0, false)
            .derive(series(&[1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidWindow));
    }
}
