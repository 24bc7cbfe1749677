use super::{require_defined, AnalysisError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionModel {
    /// Y = T + S + R
    Additive,
    /// Y = T * S * R
    Multiplicative,
}

/// Trend, seasonal and residual components, aligned with the input.
/// Trend and residual are undefined for the first and last `period / 2`
/// observations.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
    pub period: usize,
    pub model: DecompositionModel,
}

/// Classical moving-average decomposition.
pub fn decompose(
    values: &[Option<f64>],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition> {
    if period < 2 {
        return Err(AnalysisError::InvalidPeriod(period));
    }
    let data = require_defined(values)?;
    let n = data.len();
    if n < period * 2 {
        return Err(AnalysisError::InsufficientData {
            required: period * 2,
            actual: n,
        });
    }
    if model == DecompositionModel::Multiplicative {
        if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(AnalysisError::NonPositive { index, value });
        }
    }

    let trend = centered_moving_average(&data, period);

    let detrended: Vec<Option<f64>> = data
        .iter()
        .zip(&trend)
        .map(|(&y, t)| t.map(|t| combine_out(model, y, t)))
        .collect();

    // Average each phase of the cycle over the defined detrended values.
    let mut phase_sum = vec![0.0; period];
    let mut phase_count = vec![0usize; period];
    for (i, value) in detrended.iter().enumerate() {
        if let Some(v) = value {
            phase_sum[i % period] += v;
            phase_count[i % period] += 1;
        }
    }
    let mut indices: Vec<f64> = phase_sum
        .iter()
        .zip(&phase_count)
        .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { f64::NAN })
        .collect();

    let avg = indices.iter().sum::<f64>() / period as f64;
    for s in &mut indices {
        *s = combine_out(model, *s, avg);
    }

    let seasonal: Vec<f64> = (0..n).map(|i| indices[i % period]).collect();
    let residual = data
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((&y, t), &s)| t.map(|t| combine_out(model, combine_out(model, y, s), t)))
        .collect();

    Ok(Decomposition {
        observed: data,
        trend,
        seasonal,
        residual,
        period,
        model,
    })
}

/// Removes component `c` from `y` under the given model.
fn combine_out(model: DecompositionModel, y: f64, c: f64) -> f64 {
    match model {
        DecompositionModel::Additive => y - c,
        DecompositionModel::Multiplicative => y / c,
    }
}

/// Two-sided moving average; even periods use the 2×period filter with
/// half weights at both ends.
fn centered_moving_average(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    let half = period / 2;
    let n = data.len();
    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let start = i - half;
            Some(
                weights
                    .iter()
                    .zip(&data[start..start + weights.len()])
                    .map(|(w, x)| w * x)
                    .sum(),
            )
        })
        .collect()
}
