mod correlogram;
mod distribution;
mod lines;

use crate::analysis::AnalysisError;
use crate::config::{AnalysisSettings, ChartSettings};
use crate::data::{DataError, Field, PriceSeries};
use chrono::NaiveDate;
use plotters::style::RGBColor;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render error: {0}")]
    Render(String),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Not enough data to chart {0}")]
    NotEnoughData(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;

pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

pub(crate) const NAVY: RGBColor = RGBColor(0, 0, 128);
pub(crate) const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub(crate) const DARK_GREEN: RGBColor = RGBColor(0, 100, 0);
pub(crate) const STEEL_BLUE: RGBColor = RGBColor(31, 119, 180);

pub(crate) const TITLE_FONT: (&str, f64) = ("sans-serif", 28.0);
pub(crate) const CAPTION_FONT: (&str, f64) = ("sans-serif", 20.0);

/// Min/max of the finite values, padded by 10% of the span. Flat data is
/// widened so the axis never collapses.
pub fn value_range<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let span = hi - lo;
    let padding = if span > 0.0 {
        span * 0.1
    } else if lo != 0.0 {
        lo.abs() * 0.1
    } else {
        1.0
    };
    Some((lo - padding, hi + padding))
}

/// First and last date of `points`; a chart needs at least two distinct dates.
pub fn date_range<T>(points: &[(NaiveDate, T)]) -> Option<(NaiveDate, NaiveDate)> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.0 < last.0 => Some((first.0, last.0)),
        _ => None,
    }
}

/// Writes the diagnostic charts for a derived [`PriceSeries`] as PNG files.
pub struct ChartRenderer {
    settings: ChartSettings,
    analysis: AnalysisSettings,
}

impl ChartRenderer {
    pub fn new(settings: ChartSettings, analysis: AnalysisSettings) -> Self {
        Self { settings, analysis }
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.settings.output_dir.join(file_name)
    }

    /// Renders every chart in order, stopping at the first failure.
    pub fn render_all(&self, series: &PriceSeries) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.settings.output_dir)?;

        let outputs = vec![
            self.price_trend(series)?,
            self.volatility(series)?,
            self.decomposition(series)?,
            self.correlograms(series, Field::LogReturn, "acf_log_return.png")?,
            self.correlograms(series, Field::Close, "acf_close.png")?,
            self.return_distribution(series)?,
        ];

        info!(
            "Rendered {} charts into {}",
            outputs.len(),
            self.settings.output_dir.display()
        );
        Ok(outputs)
    }
}
