//! Chart drawing via plotters into an in-memory PNG.

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;

use super::{ChartStyle, ChartType};
use crate::error::{LabForgeError, Result};

/// Histogram bin count.
const HISTOGRAM_BINS: usize = 20;

fn chart_err(e: impl std::fmt::Display) -> LabForgeError {
    LabForgeError::Chart(e.to_string())
}

/// One named series of (x, y) points. For histograms only `values` is used.
pub(crate) struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Render the chart into PNG bytes.
pub(crate) fn render_png(
    chart_type: ChartType,
    series: &[Series],
    title: &str,
    x_label: &str,
    y_label: &str,
    style: &ChartStyle,
) -> Result<Vec<u8>> {
    let (width, height) = (style.width, style.height);
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        match chart_type {
            ChartType::Histogram => draw_histogram(&root, series, title, x_label, y_label, style)?,
            _ => draw_xy(&root, chart_type, series, title, x_label, y_label, style)?,
        }

        root.present().map_err(chart_err)?;
    }

    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| LabForgeError::Chart("Pixel buffer size mismatch".to_string()))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(chart_err)?;

    Ok(png)
}

fn draw_xy(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    chart_type: ChartType,
    series: &[Series],
    title: &str,
    x_label: &str,
    y_label: &str,
    style: &ChartStyle,
) -> Result<()> {
    let points: Vec<(f64, f64)> = series.iter().flat_map(|s| s.points.iter().copied()).collect();
    if points.is_empty() {
        return Err(LabForgeError::Chart("No data points to plot".to_string()));
    }

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0), false);
    let include_zero = matches!(chart_type, ChartType::Bar);
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1), include_zero);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_label).y_desc(y_label);
    if !style.grid {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(chart_err)?;

    let bar_width = bar_width_for(&points, series.len());

    for (idx, s) in series.iter().enumerate() {
        let color = series_color(idx, series.len());

        match chart_type {
            ChartType::Line => {
                chart
                    .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))
                    .map_err(chart_err)?
                    .label(&s.name)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                    });
                chart
                    .draw_series(
                        s.points
                            .iter()
                            .map(|&p| Circle::new(p, 3, color.filled())),
                    )
                    .map_err(chart_err)?;
            }
            ChartType::Scatter => {
                chart
                    .draw_series(
                        s.points
                            .iter()
                            .map(|&p| Circle::new(p, 4, color.mix(0.7).filled())),
                    )
                    .map_err(chart_err)?
                    .label(&s.name)
                    .legend(move |(x, y)| Circle::new((x + 9, y), 4, color.filled()));
            }
            ChartType::Bar => {
                chart
                    .draw_series(s.points.iter().map(|&(x, y)| {
                        Rectangle::new(
                            [(x - bar_width / 2.0, 0.0), (x + bar_width / 2.0, y)],
                            color.mix(0.7).filled(),
                        )
                    }))
                    .map_err(chart_err)?
                    .label(&s.name)
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                    });
            }
            ChartType::Histogram => unreachable!("handled by draw_histogram"),
        }
    }

    if style.legend && series.len() > 1 {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(chart_err)?;
    }

    Ok(())
}

fn draw_histogram(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    series: &[Series],
    title: &str,
    x_label: &str,
    y_label: &str,
    style: &ChartStyle,
) -> Result<()> {
    let values: Vec<f64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .collect();
    if values.is_empty() {
        return Err(LabForgeError::Chart("No data points to plot".to_string()));
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };
    let bin_width = span / HISTOGRAM_BINS as f64;

    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for &v in &values {
        let idx = (((v - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(1);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min..(min + span), 0usize..(max_count + 1))
        .map_err(chart_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_label).y_desc(y_label);
    if !style.grid {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(chart_err)?;

    let color = series_color(0, 1);
    chart
        .draw_series(counts.iter().enumerate().filter(|&(_, &c)| c > 0).map(|(i, &c)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new([(x0, 0), (x0 + bin_width, c)], color.mix(0.7).filled())
        }))
        .map_err(chart_err)?;

    Ok(())
}

/// Expand a value range by 5%, optionally anchoring zero inside it.
fn padded_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Width for bars: 80% of the smallest x gap, or a fallback slice of the span.
fn bar_width_for(points: &[(f64, f64)], series_count: usize) -> f64 {
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    xs.dedup();

    let min_gap = xs
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);

    if min_gap.is_finite() && min_gap > 0.0 {
        min_gap * 0.8
    } else {
        let span = xs.last().copied().unwrap_or(1.0) - xs.first().copied().unwrap_or(0.0);
        (span.max(1.0)) / (points.len().max(1) * series_count.max(1)) as f64
    }
}

/// Single-series charts draw in blue; overlays cycle the palette.
fn series_color(index: usize, total: usize) -> RGBColor {
    if total <= 1 {
        return RGBColor(41, 98, 255);
    }
    let c = Palette99::pick(index).to_rgba();
    RGBColor(c.0, c.1, c.2)
}
