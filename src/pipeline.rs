// src/pipeline.rs

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::collect::collect_results;
use crate::config::RunConfig;
use crate::error::StatsError;
use crate::fetch::PageSource;
use crate::plot::{render_report, ReportChart};
use crate::process::{clean, CleaningReport};
use crate::stats::{
    gaussian_kde, histogram, percentile_curve, percentile_of_score, FinishSummary, HistogramBin,
    PercentileCurve,
};
use crate::table::CleanedResultsTable;

/// Output of one run over a race listing.
#[derive(Debug, Clone, Serialize)]
pub struct RaceReport {
    pub race_name: String,
    /// Rows extracted before cleaning.
    pub raw_rows: usize,
    pub cleaning: CleaningReport,
    #[serde(skip)]
    pub table: CleanedResultsTable,
    /// `None` when no finisher survived cleaning.
    pub summary: Option<FinishSummary>,
    pub curve: Option<PercentileCurve>,
    /// Percentile rank of the configured target finish, if one was set and
    /// anyone finished.
    pub target_percentile: Option<f64>,
    pub histogram: Vec<HistogramBin>,
    /// Empty when there are too few finishers to estimate a density.
    pub kde: Vec<(f64, f64)>,
}

/// Keep going on "not enough data", fail on anything else.
fn allow_insufficient<T>(res: Result<T, StatsError>, what: &str) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(StatsError::InsufficientData(reason)) => {
            warn!(what, reason, "insufficient data");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("computing {}", what)),
    }
}

/// Collect, clean and summarise the listing `source` serves.
#[instrument(level = "info", skip_all, fields(race = %config.race_name))]
pub async fn run<S: PageSource>(source: &S, config: &RunConfig) -> Result<RaceReport> {
    let raw = collect_results(source, config.max_pages).await?;
    let (table, cleaning) = clean(&raw, config.cutoff_minutes);
    let minutes = table.finish_minutes();

    let summary = allow_insufficient(FinishSummary::from_minutes(&minutes), "summary")?;
    let curve = allow_insufficient(percentile_curve(&minutes), "percentile curve")?;
    let target_percentile = match config.target_minutes {
        Some(target) => {
            allow_insufficient(percentile_of_score(&minutes, target), "target percentile")?
        }
        None => None,
    };
    let histogram = histogram(&minutes, &config.bins);
    let kde = allow_insufficient(gaussian_kde(&minutes, &config.bins.centers()), "density")?
        .unwrap_or_default();

    if let Some(s) = &summary {
        info!(
            finishers = s.count,
            median = s.median,
            fastest = s.min,
            slowest = s.max,
            "race summary"
        );
    }
    if let (Some(target), Some(pct)) = (config.target_minutes, target_percentile) {
        info!(target_minutes = target, percentile = pct, "target finish");
    }

    Ok(RaceReport {
        race_name: config.race_name.clone(),
        raw_rows: raw.len(),
        cleaning,
        table,
        summary,
        curve,
        target_percentile,
        histogram,
        kde,
    })
}

/// Draw the report chart to `config.plot_path`, if one is configured and
/// there is a curve to draw. Returns the path written.
pub fn render_chart(report: &RaceReport, config: &RunConfig) -> Result<Option<PathBuf>> {
    let Some(path) = &config.plot_path else {
        return Ok(None);
    };
    let Some(curve) = &report.curve else {
        warn!("no finish times to plot; chart skipped");
        return Ok(None);
    };

    render_report(
        &ReportChart {
            race_name: &report.race_name,
            curve,
            histogram: &report.histogram,
            kde: &report.kde,
        },
        path,
    )?;
    Ok(Some(path.clone()))
}
