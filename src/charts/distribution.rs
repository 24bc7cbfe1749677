use super::{render_err, ChartError, ChartRenderer, Result, DARK_GREEN, TITLE_FONT};
use crate::analysis::distribution::{gaussian_kde, histogram};
use crate::data::{Field, PriceSeries};
use plotters::prelude::*;
use std::path::PathBuf;
use tracing::debug;

const KDE_POINTS: usize = 512;

impl ChartRenderer {
    /// Histogram of log returns with a kernel density curve scaled to counts.
    pub fn return_distribution(&self, series: &PriceSeries) -> Result<PathBuf> {
        let returns = series.defined(Field::LogReturn)?;
        let bins = histogram(&returns, self.settings.histogram_bins)?;
        let curve = gaussian_kde(&returns, KDE_POINTS)?;

        let bin_width = bins[0].width();
        let n = returns.len() as f64;
        let scaled: Vec<(f64, f64)> = curve.iter().map(|(x, d)| (*x, d * n * bin_width)).collect();

        let x_min = bins[0].start.min(scaled[0].0);
        let x_max = bins[bins.len() - 1].end.max(scaled[scaled.len() - 1].0);
        let y_max = bins
            .iter()
            .map(|b| b.count as f64)
            .chain(scaled.iter().map(|(_, y)| *y))
            .fold(0.0f64, f64::max);
        if y_max <= 0.0 {
            return Err(ChartError::NotEnoughData(Field::LogReturn.to_string()));
        }

        let path = self.output_path("log_return_distribution.png");
        {
            let size = self.settings.histogram_size;
            let root = BitMapBackend::new(&path, (size.width, size.height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Log Returns Distribution", TITLE_FONT.into_font())
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.1)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_desc("Log Return")
                .y_desc("Count")
                .draw()
                .map_err(render_err)?;

            chart
                .draw_series(bins.iter().map(|b| {
                    Rectangle::new(
                        [(b.start, 0.0), (b.end, b.count as f64)],
                        DARK_GREEN.mix(0.5).filled(),
                    )
                }))
                .map_err(render_err)?;

            chart
                .draw_series(LineSeries::new(scaled, DARK_GREEN.stroke_width(2)))
                .map_err(render_err)?;

            root.present().map_err(render_err)?;
        }
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
