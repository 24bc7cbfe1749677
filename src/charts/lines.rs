use super::{
    date_range, render_err, value_range, ChartError, ChartRenderer, Result, CAPTION_FONT, NAVY,
    ORANGE, STEEL_BLUE, TITLE_FONT,
};
use crate::analysis::decomposition::{decompose, Decomposition};
use crate::config::ChartSize;
use crate::data::{Field, PriceSeries};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named line drawn against dates.
struct Line<'a> {
    label: &'a str,
    points: Vec<(NaiveDate, f64)>,
    style: ShapeStyle,
}

impl ChartRenderer {
    /// Close price overlaid with its rolling mean.
    pub fn price_trend(&self, series: &PriceSeries) -> Result<PathBuf> {
        let mean_label = format!("{}-Day Rolling Mean", self.analysis.window);
        let lines = [
            Line {
                label: "Close Price",
                points: series.points(Field::Close)?,
                style: NAVY.mix(0.5).stroke_width(1),
            },
            Line {
                label: &mean_label,
                points: series.points(Field::RollingMean)?,
                style: RED.stroke_width(2),
            },
        ];

        let path = self.output_path("price_trend.png");
        draw_lines(
            &path,
            self.settings.line_size,
            "Price Trend: Close Price vs. Moving Average",
            "Price (USD)",
            &lines,
        )?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Rolling standard deviation of log returns.
    pub fn volatility(&self, series: &PriceSeries) -> Result<PathBuf> {
        let label = format!("{}-Day Rolling Volatility", self.analysis.window);
        let lines = [Line {
            label: &label,
            points: series.points(Field::Volatility)?,
            style: ORANGE.stroke_width(2),
        }];

        let path = self.output_path("volatility.png");
        draw_lines(
            &path,
            self.settings.volatility_size,
            "Risk Analysis: Volatility Clustering",
            "Standard Deviation",
            &lines,
        )?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Observed, trend, seasonal and residual panels of the Close
    /// decomposition.
    pub fn decomposition(&self, series: &PriceSeries) -> Result<PathBuf> {
        let close = series.require(Field::Close)?;
        let result = decompose(
            close,
            self.analysis.seasonal_period,
            self.analysis.decomposition_model,
        )?;

        let path = self.output_path("decomposition.png");
        draw_decomposition(&path, self.settings.decomposition_size, series.dates(), &result)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

fn draw_lines(
    path: &Path,
    size: ChartSize,
    title: &str,
    y_desc: &str,
    lines: &[Line<'_>],
) -> Result<()> {
    let all_points: Vec<(NaiveDate, f64)> =
        lines.iter().flat_map(|l| l.points.iter().copied()).collect();
    let mut sorted = all_points.clone();
    sorted.sort_by_key(|(date, _)| *date);
    let (x_min, x_max) =
        date_range(&sorted).ok_or_else(|| ChartError::NotEnoughData(title.to_string()))?;
    let (y_min, y_max) = value_range(all_points.iter().map(|(_, v)| *v))
        .ok_or_else(|| ChartError::NotEnoughData(title.to_string()))?;

    let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, TITLE_FONT.into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .y_desc(y_desc)
        .x_desc("Date")
        .draw()
        .map_err(render_err)?;

    for line in lines {
        let style = line.style;
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), style))
            .map_err(render_err)?
            .label(line.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_decomposition(
    path: &Path,
    size: ChartSize,
    dates: &[NaiveDate],
    result: &Decomposition,
) -> Result<()> {
    let observed: Vec<Option<f64>> = result.observed.iter().copied().map(Some).collect();
    let seasonal: Vec<Option<f64>> = result.seasonal.iter().copied().map(Some).collect();
    let panels: [(&str, &[Option<f64>]); 4] = [
        ("Observed", &observed),
        ("Trend", &result.trend),
        ("Seasonal", &seasonal),
        ("Residual", &result.residual),
    ];

    let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let body = root
        .titled("Time Series Decomposition", TITLE_FONT.into_font())
        .map_err(render_err)?;

    for (area, (name, values)) in body.split_evenly((4, 1)).iter().zip(panels) {
        let points: Vec<(NaiveDate, f64)> = dates
            .iter()
            .zip(values)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect();
        draw_panel(area, name, &points)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    name: &str,
    points: &[(NaiveDate, f64)],
) -> Result<()> {
    let (x_min, x_max) =
        date_range(points).ok_or_else(|| ChartError::NotEnoughData(name.to_string()))?;
    let (y_min, y_max) = value_range(points.iter().map(|(_, v)| *v))
        .ok_or_else(|| ChartError::NotEnoughData(name.to_string()))?;

    let mut chart = ChartBuilder::on(area)
        .caption(name, CAPTION_FONT.into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_err)?;

    chart.configure_mesh().draw().map_err(render_err)?;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), STEEL_BLUE.stroke_width(1)))
        .map_err(render_err)?;
    Ok(())
}
