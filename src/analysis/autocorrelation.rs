use super::{AnalysisError, Result};
use tracing::warn;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.959_963_984_540_054;

/// Correlation by lag (index 0 is lag 0) with the half-width of the 95%
/// confidence band around zero at each lag.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlogram {
    pub values: Vec<f64>,
    pub bounds: Vec<f64>,
}

impl Correlogram {
    pub fn max_lag(&self) -> usize {
        self.values.len().saturating_sub(1)
    }
}

fn check_input(data: &[f64]) -> Result<()> {
    if data.len() < 3 {
        return Err(AnalysisError::InsufficientData {
            required: 3,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Biased sample autocorrelation (denominator `n * c0`), with Bartlett
/// confidence bands.
pub fn acf(data: &[f64], max_lags: usize) -> Result<Correlogram> {
    check_input(data)?;
    let n = data.len();
    let lags = max_lags.min(n - 1);
    if lags < max_lags {
        warn!("ACF lags clamped from {} to {}", max_lags, lags);
    }

    let values = autocorrelations(data, lags)?;

    // Bartlett: var(r_k) = (1 + 2 * sum_{j<k} r_j^2) / n
    let mut bounds = Vec::with_capacity(values.len());
    bounds.push(0.0);
    let mut cumulative = 0.0;
    for k in 1..values.len() {
        if k > 1 {
            cumulative += values[k - 1] * values[k - 1];
        }
        bounds.push(Z_95 * ((1.0 + 2.0 * cumulative) / n as f64).sqrt());
    }

    Ok(Correlogram { values, bounds })
}

/// Yule-Walker partial autocorrelation via Durbin-Levinson, limited to
/// lags below `n / 2`.
pub fn pacf(data: &[f64], max_lags: usize) -> Result<Correlogram> {
    check_input(data)?;
    let n = data.len();
    let lags = max_lags.min(n / 2 - 1);
    if lags < max_lags {
        warn!("PACF lags clamped from {} to {}", max_lags, lags);
    }

    let r = autocorrelations(data, lags)?;
    let mut values = vec![0.0; lags + 1];
    values[0] = 1.0;
    if lags == 0 {
        return Ok(Correlogram {
            values,
            bounds: vec![0.0],
        });
    }

    let mut phi = vec![0.0; lags + 1];
    phi[1] = r[1];
    values[1] = r[1];

    for k in 2..=lags {
        let num = r[k] - (1..k).map(|j| phi[j] * r[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi[j] * r[j]).sum::<f64>();
        if den.abs() < 1e-12 {
            break;
        }
        let phi_kk = num / den;

        let prev = phi.clone();
        for j in 1..k {
            phi[j] = prev[j] - phi_kk * prev[k - j];
        }
        phi[k] = phi_kk;
        values[k] = phi_kk;
    }

    let bound = Z_95 / (n as f64).sqrt();
    let mut bounds = vec![bound; lags + 1];
    bounds[0] = 0.0;

    Ok(Correlogram { values, bounds })
}

fn autocorrelations(data: &[f64], lags: usize) -> Result<Vec<f64>> {
    let n = data.len();
    let mean = data.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();
    let c0 = centered.iter().map(|x| x * x).sum::<f64>();
    if c0 <= f64::EPSILON * n as f64 * mean.abs().max(1.0) {
        return Err(AnalysisError::ZeroVariance);
    }

    Ok((0..=lags)
        .map(|lag| {
            centered[lag..]
                .iter()
                .zip(&centered[..n - lag])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / c0
        })
        .collect())
}
