use chrono::{Duration, NaiveDate};
use price_eda::analysis::features::FeatureDeriver;
use price_eda::charts::{ChartError, ChartRenderer};
use price_eda::config::{AnalysisSettings, ChartSettings, DataSettings};
use price_eda::data::loader::PriceLoader;
use price_eda::data::PriceSeries;
use std::fs;
use std::path::PathBuf;

/// Newest-first rows in the exported format, two full years and change.
fn synthetic_csv(rows: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut state: u64 = 42;
    let mut lines = Vec::with_capacity(rows);
    for t in 0..rows {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let noise = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
        let seasonal = 8.0 * (2.0 * std::f64::consts::PI * t as f64 / 252.0).sin();
        let close = 100.0 + 0.05 * t as f64 + seasonal + noise;
        let date = start + Duration::days(t as i64);
        lines.push(format!(
            "{},${:.2},1000,${:.2},${:.2},${:.2}",
            date.format("%m/%d/%Y"),
            close,
            close - 0.3,
            close + 0.8,
            close - 0.9
        ));
    }
    lines.reverse();
    format!("Date,Close/Last,Volume,Open,High,Low\n{}\n", lines.join("\n"))
}

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("price_eda_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn derived_series(rows: usize) -> PriceSeries {
    let series = PriceLoader::from_csv_str(&synthetic_csv(rows), &DataSettings::default()).unwrap();
    FeatureDeriver::from_settings(&AnalysisSettings::default())
        .derive(series)
        .unwrap()
}

#[test]
fn test_render_all_writes_six_charts_in_order() {
    let series = derived_series(600);
    assert_eq!(series.len(), 599);

    let dir = output_dir("render_all");
    let mut settings = ChartSettings::default();
    settings.output_dir = dir.clone();
    let renderer = ChartRenderer::new(settings, AnalysisSettings::default());

    let outputs = renderer.render_all(&series).expect("render_all should succeed");

    let names: Vec<String> = outputs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "price_trend.png",
            "volatility.png",
            "decomposition.png",
            "acf_log_return.png",
            "acf_close.png",
            "log_return_distribution.png",
        ]
    );
    for path in &outputs {
        assert!(path.starts_with(&dir));
        let meta = fs::metadata(path).unwrap_or_else(|_| panic!("{} missing", path.display()));
        assert!(meta.len() > 0, "{} is empty", path.display());
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_two_rows_is_not_enough_to_chart() {
    let series = PriceLoader::from_csv_str(&synthetic_csv(2), &DataSettings::default()).unwrap();
    let derived = FeatureDeriver::new(20, false).derive(series).unwrap();
    assert_eq!(derived.len(), 1);

    let dir = output_dir("two_rows");
    let mut settings = ChartSettings::default();
    settings.output_dir = dir.clone();
    let renderer = ChartRenderer::new(settings, AnalysisSettings::default());

    let err = renderer.render_all(&derived).unwrap_err();
    assert!(matches!(err, ChartError::NotEnoughData(_)));

    let _ = fs::remove_dir_all(&dir);
}
