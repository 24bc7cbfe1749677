//! Exploratory analysis of a historical price CSV.
//!
//! The pipeline runs once, in order: [`data::loader::PriceLoader`] cleans the
//! file into a [`data::PriceSeries`], [`analysis::features::FeatureDeriver`]
//! appends returns and rolling risk, and [`charts::ChartRenderer`] writes the
//! diagnostic charts.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
