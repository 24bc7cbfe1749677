use super::{AnalysisError, Result};
use ndarray::Array1;
use ndarray_stats::{interpolate::Linear, Quantile1dExt};
use noisy_float::types::{n64, N64};
use std::fmt;

/// Count, moments and quartiles of a sample, in the layout of a
/// `describe()` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    pub const ROWS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Summarizes the finite values of `values`.
    pub fn of(values: &[f64]) -> Result<Self> {
        let finite: Array1<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let mean = finite.mean().unwrap_or(f64::NAN);
        let std = if finite.len() > 1 { finite.std(1.0) } else { f64::NAN };

        let mut ordered: Array1<N64> = finite.mapv(n64);
        let mut quantile = |q: f64| -> f64 {
            ordered
                .quantile_mut(n64(q), &Linear)
                .map(|v| v.raw())
                .unwrap_or(f64::NAN)
        };

        Ok(Self {
            count: finite.len(),
            mean,
            std,
            min: quantile(0.0),
            q25: quantile(0.25),
            median: quantile(0.5),
            q75: quantile(0.75),
            max: quantile(1.0),
        })
    }

    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Side-by-side summaries of named columns.
pub struct SummaryTable {
    pub columns: Vec<(String, Summary)>,
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}", "")?;
        for (name, _) in &self.columns {
            write!(f, " {:>14}", name)?;
        }
        writeln!(f)?;
        for (row, label) in Summary::ROWS.iter().enumerate() {
            write!(f, "{:<8}", label)?;
            for (_, summary) in &self.columns {
                write!(f, " {:>14.4}", summary.values()[row])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
