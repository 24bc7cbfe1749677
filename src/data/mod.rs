pub mod loader;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Column '{column}' line {line}: '{value}' is not numeric")]
    Parse {
        column: String,
        line: u64,
        value: String,
    },
    #[error("Line {line}: cannot parse date '{value}'")]
    DateParse { line: u64, value: String },
    #[error("Column '{column}' has negative price {value} on {date}")]
    NegativePrice {
        column: String,
        date: NaiveDate,
        value: f64,
    },
    #[error("Duplicate date: {0}")]
    DuplicateDate(NaiveDate),
    #[error("Dates are not strictly increasing at {0}")]
    UnsortedDates(NaiveDate),
    #[error("Column '{column}' has {actual} cells, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("No data rows found")]
    Empty,
}

pub type Result<T> = std::result::Result<T, DataError>;

/// One column of a [`PriceSeries`]; `None` marks an undefined cell.
pub type Column = Vec<Option<f64>>;

/// Columns a [`PriceSeries`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    LogReturn,
    SimpleReturn,
    RollingMean,
    Volatility,
}

impl Field {
    pub const PRICES: [Field; 4] = [Field::Close, Field::Open, Field::High, Field::Low];

    /// Canonical column label.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::LogReturn => "Log_Return",
            Field::SimpleReturn => "Simple_Return",
            Field::RollingMean => "Rolling_Mean",
            Field::Volatility => "Volatility",
        }
    }

    pub fn from_label(label: &str) -> Option<Field> {
        match label {
            "Open" => Some(Field::Open),
            "High" => Some(Field::High),
            "Low" => Some(Field::Low),
            "Close" => Some(Field::Close),
            "Log_Return" => Some(Field::LogReturn),
            "Simple_Return" => Some(Field::SimpleReturn),
            "Rolling_Mean" => Some(Field::RollingMean),
            "Volatility" => Some(Field::Volatility),
            _ => None,
        }
    }

    pub fn is_price(&self) -> bool {
        matches!(self, Field::Open | Field::High | Field::Low | Field::Close)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Date-indexed price table. Dates are unique and strictly ascending, and
/// every column holds exactly one cell per date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Field, Column>,
}

impl PriceSeries {
    pub fn new(dates: Vec<NaiveDate>, columns: BTreeMap<Field, Column>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(if pair[0] == pair[1] {
                DataError::DuplicateDate(pair[1])
            } else {
                DataError::UnsortedDates(pair[1])
            });
        }

        let mut series = Self {
            dates,
            columns: BTreeMap::new(),
        };
        for (field, column) in columns {
            series.insert_column(field, column)?;
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn column(&self, field: Field) -> Option<&[Option<f64>]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    /// Like [`PriceSeries::column`] but a missing column is a schema error.
    pub fn require(&self, field: Field) -> Result<&[Option<f64>]> {
        self.column(field)
            .ok_or_else(|| DataError::MissingColumn(field.label().to_string()))
    }

    /// Defined cells of a column, in date order.
    pub fn defined(&self, field: Field) -> Result<Vec<f64>> {
        Ok(self.require(field)?.iter().flatten().copied().collect())
    }

    /// `(date, value)` pairs for the defined cells of a column.
    pub fn points(&self, field: Field) -> Result<Vec<(NaiveDate, f64)>> {
        let column = self.require(field)?;
        Ok(self
            .dates
            .iter()
            .zip(column)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect())
    }

    pub fn insert_column(&mut self, field: Field, column: Column) -> Result<()> {
        if column.len() != self.dates.len() {
            return Err(DataError::LengthMismatch {
                column: field.label().to_string(),
                expected: self.dates.len(),
                actual: column.len(),
            });
        }
        self.columns.insert(field, column);
        Ok(())
    }

    /// Drops every row where any of `fields` that is present has an
    /// undefined cell. Returns the number of rows removed.
    pub fn drop_undefined(&mut self, fields: &[Field]) -> usize {
        let keep: Vec<bool> = (0..self.dates.len())
            .map(|row| {
                fields.iter().all(|field| match self.columns.get(field) {
                    Some(column) => column[row].is_some(),
                    None => true,
                })
            })
            .collect();

        let removed = keep.iter().filter(|&&k| !k).count();
        if removed == 0 {
            return 0;
        }

        self.dates = retain_rows(&self.dates, &keep);
        for column in self.columns.values_mut() {
            *column = retain_rows(column, &keep);
        }
        removed
    }
}

fn retain_rows<T: Copy>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter_map(|(value, &k)| k.then_some(*value))
        .collect()
}
