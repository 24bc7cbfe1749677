use super::{AnalysisError, Result};
use ndarray::Array1;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

fn finite_values(values: &[f64]) -> Result<Array1<f64>> {
    let finite: Array1<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(AnalysisError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(finite)
}

fn extent(values: &Array1<f64>) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Equal-width histogram over `[min, max]`; the last bin is closed on both
/// sides. A degenerate range is widened by 0.5 either way.
pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<Bin>> {
    let bins = bins.max(1);
    let finite = finite_values(values)?;
    let (mut lo, mut hi) = extent(&finite);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in finite.iter() {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count,
        })
        .collect())
}

/// Gaussian kernel density with Scott's bandwidth, evaluated on `points`
/// evenly spaced locations spanning the data plus three bandwidths.
pub fn gaussian_kde(values: &[f64], points: usize) -> Result<Vec<(f64, f64)>> {
    let finite = finite_values(values)?;
    let n = finite.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    let sigma = finite.std(1.0);
    if sigma <= 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }

    let bandwidth = sigma * (n as f64).powf(-0.2);
    let (lo, hi) = extent(&finite);
    let (lo, hi) = (lo - 3.0 * bandwidth, hi + 3.0 * bandwidth);
    let points = points.max(2);
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());

    Ok((0..points)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density = finite
                .iter()
                .map(|&v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect())
}
