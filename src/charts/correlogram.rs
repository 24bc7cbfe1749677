use super::{render_err, ChartRenderer, Result, CAPTION_FONT, STEEL_BLUE, TITLE_FONT};
use crate::analysis::autocorrelation::{acf, pacf, Correlogram};
use crate::analysis::require_defined;
use crate::data::{Field, PriceSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;
use tracing::debug;

impl ChartRenderer {
    /// ACF and PACF of one column, side by side.
    pub fn correlograms(
        &self,
        series: &PriceSeries,
        field: Field,
        file_name: &str,
    ) -> Result<PathBuf> {
        let values = require_defined(series.require(field)?)?;
        let max_lags = self.analysis.max_lags;
        let auto = acf(&values, max_lags)?;
        let partial = pacf(&values, max_lags)?;

        let path = self.output_path(file_name);
        {
            let size = self.settings.correlogram_size;
            let root = BitMapBackend::new(&path, (size.width, size.height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let body = root
                .titled(&format!("Correlograms - {}", field), TITLE_FONT.into_font())
                .map_err(render_err)?;

            let panels = body.split_evenly((1, 2));
            draw_correlogram(
                &panels[0],
                &format!("Autocorrelation (ACF) - {}", field),
                &auto,
            )?;
            draw_correlogram(
                &panels[1],
                &format!("Partial Autocorrelation (PACF) - {}", field),
                &partial,
            )?;

            root.present().map_err(render_err)?;
        }
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

fn draw_correlogram(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    correlogram: &Correlogram,
) -> Result<()> {
    let max_lag = correlogram.max_lag() as f64;
    let y_bound = correlogram
        .values
        .iter()
        .chain(&correlogram.bounds)
        .fold(1.0f64, |acc, v| acc.max(v.abs()))
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(title, CAPTION_FONT.into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-1.0..max_lag + 1.0, -y_bound..y_bound)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Lags")
        .y_desc("Correlation")
        .draw()
        .map_err(render_err)?;

    // Confidence band around zero, lag 1 onwards.
    if correlogram.bounds.len() > 1 {
        let upper = correlogram
            .bounds
            .iter()
            .enumerate()
            .skip(1)
            .map(|(lag, b)| (lag as f64, *b));
        let lower = correlogram
            .bounds
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .map(|(lag, b)| (lag as f64, -b));
        chart
            .draw_series(std::iter::once(Polygon::new(
                upper.chain(lower).collect::<Vec<_>>(),
                STEEL_BLUE.mix(0.2).filled(),
            )))
            .map_err(render_err)?;
    }

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(-1.0, 0.0), (max_lag + 1.0, 0.0)],
            BLACK.stroke_width(1),
        )))
        .map_err(render_err)?;

    chart
        .draw_series(correlogram.values.iter().enumerate().map(|(lag, v)| {
            PathElement::new(vec![(lag as f64, 0.0), (lag as f64, *v)], STEEL_BLUE.stroke_width(1))
        }))
        .map_err(render_err)?;

    chart
        .draw_series(
            correlogram
                .values
                .iter()
                .enumerate()
                .map(|(lag, v)| Circle::new((lag as f64, *v), 4, STEEL_BLUE.filled())),
        )
        .map_err(render_err)?;

    Ok(())
}
