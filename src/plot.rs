// src/plot.rs

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use crate::stats::{HistogramBin, PercentileCurve};

const SIZE: (u32, u32) = (1200, 600);
const CURVE_COLOR: RGBColor = RGBColor(31, 119, 180);
const KDE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Everything the two chart panels draw.
#[derive(Debug, Clone)]
pub struct ReportChart<'a> {
    pub race_name: &'a str,
    pub curve: &'a PercentileCurve,
    pub histogram: &'a [HistogramBin],
    /// Empty when the density estimate could not be computed.
    pub kde: &'a [(f64, f64)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Png,
    Svg,
}

impl ChartKind {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ChartKind::Svg,
            _ => ChartKind::Png,
        }
    }
}

/// `(lo, hi)` with a little headroom, never a zero-width range.
fn padded_range(lo: f64, hi: f64, pad: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let margin = (hi - lo) * pad;
    (lo - margin, hi + margin)
}

/// Render the percentile panel and the density panel side by side.
pub fn render_report(chart: &ReportChart<'_>, path: &Path) -> Result<()> {
    let rendered = match ChartKind::for_path(path) {
        ChartKind::Png => {
            let root = BitMapBackend::new(path, SIZE).into_drawing_area();
            draw_report(root, chart)
        }
        ChartKind::Svg => {
            let root = SVGBackend::new(path, SIZE).into_drawing_area();
            draw_report(root, chart)
        }
    };
    rendered.with_context(|| format!("rendering chart to {}", path.display()))?;

    info!(path = %path.display(), "chart written");
    Ok(())
}

fn draw_report<DB>(root: DrawingArea<DB, Shift>, chart: &ReportChart<'_>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));
    draw_percentiles(&panels[0], chart)?;
    draw_density(&panels[1], chart)?;
    root.present()?;
    Ok(())
}

fn draw_percentiles<DB>(area: &DrawingArea<DB, Shift>, chart: &ReportChart<'_>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points = &chart.curve.points;
    let lo = points.first().map_or(0.0, |p| p.finish_minutes);
    let hi = points.last().map_or(1.0, |p| p.finish_minutes);
    let (y_lo, y_hi) = padded_range(lo, hi, 0.05);

    let mut ctx = ChartBuilder::on(area)
        .caption(
            format!("{}: Percentile Distribution", chart.race_name),
            ("sans-serif", 20),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..100f64, y_lo..y_hi)?;

    ctx.configure_mesh()
        .x_desc("Percentile")
        .y_desc("Finish Time (mins)")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    ctx.draw_series(points.iter().map(|p| {
        Circle::new(
            (f64::from(p.percentile), p.finish_minutes),
            3,
            CURVE_COLOR.filled(),
        )
    }))?
    .label(chart.race_name.to_string())
    .legend(|(x, y)| Circle::new((x, y), 3, CURVE_COLOR.filled()));

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_density<DB>(area: &DrawingArea<DB, Shift>, chart: &ReportChart<'_>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_lo = chart.histogram.first().map_or(0.0, |b| b.lower);
    let x_hi = chart.histogram.last().map_or(1.0, |b| b.upper);
    let y_max = chart
        .histogram
        .iter()
        .map(|b| b.density)
        .chain(chart.kde.iter().map(|(_, y)| *y))
        .fold(0.0, f64::max);
    let y_hi = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut ctx = ChartBuilder::on(area)
        .caption(
            format!("{}: Distribution of Finish Times", chart.race_name),
            ("sans-serif", 20),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)?;

    ctx.configure_mesh()
        .x_desc("Finish Time (mins)")
        .y_desc("Estimated Density Function")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.4}", v))
        .draw()?;

    ctx.draw_series(chart.histogram.iter().map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.density)],
            CURVE_COLOR.mix(0.4).filled(),
        )
    }))?;

    if !chart.kde.is_empty() {
        ctx.draw_series(LineSeries::new(
            chart.kde.iter().copied(),
            KDE_COLOR.stroke_width(3),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{gaussian_kde, histogram, percentile_curve, BinGrid};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn chart_kind_from_extension() {
        assert_eq!(ChartKind::for_path(&PathBuf::from("a/b.svg")), ChartKind::Svg);
        assert_eq!(ChartKind::for_path(&PathBuf::from("b.SVG")), ChartKind::Svg);
        assert_eq!(ChartKind::for_path(&PathBuf::from("b.png")), ChartKind::Png);
        assert_eq!(ChartKind::for_path(&PathBuf::from("chart")), ChartKind::Png);
    }

    #[test]
    fn ranges_are_never_degenerate() {
        assert_eq!(padded_range(200.0, 200.0, 0.05), (199.0, 201.0));
        assert_eq!(padded_range(100.0, 300.0, 0.05), (90.0, 310.0));
        assert_eq!(padded_range(f64::NAN, 1.0, 0.05), (0.0, 1.0));
    }

    /// Needs system fonts for axis labels; run with `-- --ignored`.
    #[test]
    #[ignore]
    fn renders_svg_report() -> Result<()> {
        let minutes: Vec<f64> = (0..200).map(|i| 180.0 + (i % 97) as f64 * 1.7).collect();
        let grid = BinGrid::default();
        let curve = percentile_curve(&minutes)?;
        let bins = histogram(&minutes, &grid);
        let kde = gaussian_kde(&minutes, &grid.centers())?;

        let dir = tempdir()?;
        let path = dir.path().join("report.svg");
        render_report(
            &ReportChart {
                race_name: "Test Marathon",
                curve: &curve,
                histogram: &bins,
                kde: &kde,
            },
            &path,
        )?;

        let svg = std::fs::read_to_string(&path)?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Test Marathon"));
        Ok(())
    }
}
