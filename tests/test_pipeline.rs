use approx::assert_relative_eq;
use price_eda::analysis::autocorrelation::{acf, pacf};
use price_eda::analysis::decomposition::{decompose, DecompositionModel};
use price_eda::analysis::features::FeatureDeriver;
use price_eda::analysis::stats::Summary;
use price_eda::analysis::AnalysisError;
use price_eda::charts::{ChartError, ChartRenderer};
use price_eda::config::{AnalysisSettings, ChartSettings, Config, DataSettings};
use price_eda::data::loader::PriceLoader;
use price_eda::data::{DataError, Field};

const SAMPLE: &str = "tests/data/sample_prices.csv";

#[test]
fn test_load_sample_file() {
    let series = PriceLoader::load(SAMPLE, &DataSettings::default()).expect("Failed to load sample");

    assert_eq!(series.len(), 40);
    assert!(series.dates().windows(2).all(|d| d[0] < d[1]));
    for field in Field::PRICES {
        assert!(series.has(field), "missing {}", field);
    }

    // File is newest-first; the oldest close comes first after loading.
    let close = series.require(Field::Close).unwrap();
    assert_relative_eq!(close[0].unwrap(), 120.24);
    assert_relative_eq!(close[39].unwrap(), 133.20);
}

#[test]
fn test_derive_sample_file() {
    let series = PriceLoader::load(SAMPLE, &DataSettings::default()).unwrap();
    let first_close = series.require(Field::Close).unwrap()[0].unwrap();
    let second_close = series.require(Field::Close).unwrap()[1].unwrap();

    let derived = FeatureDeriver::from_settings(&AnalysisSettings::default())
        .derive(series)
        .unwrap();

    assert_eq!(derived.len(), 39);
    let log_return = derived.require(Field::LogReturn).unwrap();
    assert_relative_eq!(
        log_return[0].unwrap(),
        (second_close / first_close).ln(),
        epsilon = 1e-12
    );

    let mean = derived.require(Field::RollingMean).unwrap();
    assert_eq!(mean.iter().filter(|v| v.is_none()).count(), 19);
    let vol = derived.require(Field::Volatility).unwrap();
    assert_eq!(vol.iter().filter(|v| v.is_none()).count(), 19);
    assert!(derived.has(Field::SimpleReturn));

    let summary = Summary::of(&derived.defined(Field::LogReturn).unwrap()).unwrap();
    assert_eq!(summary.count, 39);
    assert!(summary.min <= summary.q25 && summary.q75 <= summary.max);
}

#[test]
fn test_correlograms_on_sample() {
    let series = PriceLoader::load(SAMPLE, &DataSettings::default()).unwrap();
    let derived = FeatureDeriver::new(20, false).derive(series).unwrap();
    let returns = derived.defined(Field::LogReturn).unwrap();

    let auto = acf(&returns, 40).unwrap();
    let partial = pacf(&returns, 40).unwrap();
    assert_eq!(auto.max_lag(), 38);
    assert_eq!(partial.max_lag(), 18);
    assert_relative_eq!(auto.values[1], partial.values[1], epsilon = 1e-12);
}

#[test]
fn test_sample_too_short_for_yearly_decomposition() {
    let series = PriceLoader::load(SAMPLE, &DataSettings::default()).unwrap();
    let close = series.require(Field::Close).unwrap();
    let err = decompose(close, 252, DecompositionModel::Multiplicative).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { required: 504, .. }));
}

#[test]
fn test_renderer_surfaces_decomposition_failure() {
    let series = PriceLoader::load(SAMPLE, &DataSettings::default()).unwrap();
    let derived = FeatureDeriver::new(20, false).derive(series).unwrap();
    let renderer = ChartRenderer::new(ChartSettings::default(), AnalysisSettings::default());

    // Fails before anything is drawn.
    let err = renderer.decomposition(&derived).unwrap_err();
    assert!(matches!(
        err,
        ChartError::Analysis(AnalysisError::InsufficientData { .. })
    ));
}

#[test]
fn test_missing_file_is_reported() {
    let err = PriceLoader::load("tests/data/missing.csv", &DataSettings::default()).unwrap_err();
    assert!(matches!(
        err,
        DataError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound
    ));
}

#[test]
fn test_shipped_config_is_valid() {
    let config = Config::load("config/eda.yaml").expect("config/eda.yaml should parse");
    assert_eq!(config.analysis.window, 20);
    assert_eq!(config.analysis.seasonal_period, 252);
    assert_eq!(config.analysis.max_lags, 40);
    assert_eq!(
        config.analysis.decomposition_model,
        DecompositionModel::Multiplicative
    );
}
