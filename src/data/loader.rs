use super::{Column, DataError, Field, PriceSeries, Result};
use crate::config::DataSettings;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Cells treated as missing rather than malformed.
const MISSING_MARKERS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct PriceLoader;

impl PriceLoader {
    pub fn load<P: AsRef<Path>>(path: P, settings: &DataSettings) -> Result<PriceSeries> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_reader(file);

        info!("Loading price data from {}", path.display());
        Self::from_reader(rdr, settings)
    }

    pub fn from_csv_str(data: &str, settings: &DataSettings) -> Result<PriceSeries> {
        let rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_reader(data.as_bytes());
        Self::from_reader(rdr, settings)
    }

    fn from_reader<R: std::io::Read>(
        mut rdr: csv::Reader<R>,
        settings: &DataSettings,
    ) -> Result<PriceSeries> {
        let raw_headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        debug!("Initial columns: {:?}", raw_headers);
        let headers = normalize_headers(&raw_headers, &settings.legacy_close_label);

        let date_idx = headers
            .iter()
            .position(|h| *h == settings.date_column)
            .ok_or_else(|| DataError::MissingColumn(settings.date_column.clone()))?;

        // Configured price columns that exist in the file, in configured order.
        let price_idx: Vec<(Field, usize)> = settings
            .price_columns
            .iter()
            .filter_map(|name| {
                let field = Field::from_label(name).filter(Field::is_price)?;
                let idx = headers.iter().position(|h| h == name)?;
                Some((field, idx))
            })
            .collect();

        let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
        let mut stripped = vec![false; price_idx.len()];
        let mut record = StringRecord::new();

        while rdr.read_record(&mut record)? {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_date(raw_date, &settings.date_formats).ok_or_else(|| {
                DataError::DateParse {
                    line,
                    value: raw_date.to_string(),
                }
            })?;

            let mut values = Vec::with_capacity(price_idx.len());
            for (slot, (field, idx)) in price_idx.iter().enumerate() {
                let raw = record.get(*idx).unwrap_or_default();
                if raw.contains(settings.currency_symbol) {
                    stripped[slot] = true;
                }
                let value = parse_price(raw, settings.currency_symbol).ok_or_else(|| {
                    DataError::Parse {
                        column: field.label().to_string(),
                        line,
                        value: raw.to_string(),
                    }
                })?;
                if let Some(v) = value.filter(|v| *v < 0.0) {
                    return Err(DataError::NegativePrice {
                        column: field.label().to_string(),
                        date,
                        value: v,
                    });
                }
                values.push(value);
            }
            rows.push((date, values));
        }

        if rows.is_empty() {
            return Err(DataError::Empty);
        }

        for ((field, _), was_stripped) in price_idx.iter().zip(&stripped) {
            if *was_stripped {
                debug!(
                    "Stripped '{}' from column {}",
                    settings.currency_symbol, field
                );
            }
        }

        rows.sort_by_key(|(date, _)| *date);
        if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(DataError::DuplicateDate(pair[0].0));
        }

        let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
        let mut columns: BTreeMap<Field, Column> = BTreeMap::new();
        for (slot, (field, _)) in price_idx.iter().enumerate() {
            columns.insert(*field, rows.iter().map(|(_, values)| values[slot]).collect());
        }

        let series = PriceSeries::new(dates, columns)?;
        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            info!(
                "Data cleaned: {} rows from {} to {}",
                series.len(),
                first,
                last
            );
        }
        Ok(series)
    }
}

/// Trims every label and renames the legacy close label to `Close`.
/// Applying it to its own output changes nothing.
pub fn normalize_headers(headers: &[String], legacy_close_label: &str) -> Vec<String> {
    headers
        .iter()
        .map(|h| {
            let trimmed = h.trim();
            if trimmed == legacy_close_label {
                Field::Close.label().to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

/// Removes the currency symbol and surrounding whitespace.
pub fn strip_currency(raw: &str, symbol: char) -> String {
    raw.replace(symbol, "").trim().to_string()
}

/// Parses a price cell. `Some(None)` is a missing cell, `None` a malformed one.
pub fn parse_price(raw: &str, symbol: char) -> Option<Option<f64>> {
    let cleaned = strip_currency(raw, symbol);
    if MISSING_MARKERS.contains(&cleaned.as_str()) {
        return Some(None);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .map(Some)
}

pub fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let raw = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}
