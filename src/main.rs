use anyhow::{Context, Result};
use price_eda::analysis::features::FeatureDeriver;
use price_eda::analysis::stats::{Summary, SummaryTable};
use price_eda::charts::ChartRenderer;
use price_eda::config::{config_path, Config, CONFIG_ENV};
use price_eda::data::loader::PriceLoader;
use price_eda::data::{Field, PriceSeries};
use std::env;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("price_eda=info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_path = config_path(env::var(CONFIG_ENV).ok());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        // First positional argument overrides the configured data path
        .with_data_path(env::args().nth(1).map(PathBuf::from));

    let data_path = &config.data.path;
    let series = PriceLoader::load(data_path, &config.data)
        .with_context(|| format!("Failed to load {}", data_path.display()))?;

    let series = FeatureDeriver::from_settings(&config.analysis)
        .derive(series)
        .context("Failed to derive features")?;

    print_summary(&series)?;

    let renderer = ChartRenderer::new(config.charts.clone(), config.analysis.clone());
    let outputs = renderer
        .render_all(&series)
        .context("Failed to render charts")?;
    for path in &outputs {
        info!("Chart written: {}", path.display());
    }

    Ok(())
}

fn print_summary(series: &PriceSeries) -> Result<()> {
    let mut columns = Vec::new();
    for field in [Field::Close, Field::LogReturn] {
        let summary = Summary::of(&series.defined(field)?)
            .with_context(|| format!("Failed to summarize {}", field))?;
        columns.push((field.to_string(), summary));
    }

    println!("\n--- Descriptive Statistics ---");
    println!("{}", SummaryTable { columns });
    Ok(())
}
