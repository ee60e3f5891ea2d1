use serde::Serialize;
use tracing::{debug, info};

use crate::process::finish_parser::parse_finish;
use crate::process::time_codec::{exact_minutes, time_to_minutes};
use crate::table::{CleanedResultsTable, CleanedRow, ResultsTable};

/// Finishes beyond this many minutes (07:00:00) are treated as entry errors.
pub const DEFAULT_CUTOFF_MINUTES: f64 = 7.0 * 60.0;

/// What `clean` kept and what it threw away.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub kept: usize,
    pub unparseable: usize,
    pub over_cutoff: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.unparseable + self.over_cutoff
    }
}

/// Parse finish times, drop unparseable rows and rows slower than
/// `cutoff_minutes`, and attach the finish in minutes to every survivor.
///
/// Row order is preserved and surviving rows are carried over unchanged.
pub fn clean(table: &ResultsTable, cutoff_minutes: f64) -> (CleanedResultsTable, CleaningReport) {
    let mut report = CleaningReport::default();
    let mut rows = Vec::with_capacity(table.rows.len());

    for raw in &table.rows {
        let Some(finish_time) = parse_finish(&raw.finish) else {
            debug!(rank = %raw.rank, finish = %raw.finish, "unparseable finish; dropped");
            report.unparseable += 1;
            continue;
        };

        if exact_minutes(finish_time) > cutoff_minutes {
            debug!(rank = %raw.rank, finish = %raw.finish, "finish beyond cutoff; dropped");
            report.over_cutoff += 1;
            continue;
        }

        rows.push(CleanedRow {
            raw: raw.clone(),
            finish_time,
            finish_minutes: time_to_minutes(finish_time),
        });
    }

    report.kept = rows.len();
    info!(
        kept = report.kept,
        unparseable = report.unparseable,
        over_cutoff = report.over_cutoff,
        "cleaned results"
    );

    (
        CleanedResultsTable {
            header: table.header.clone(),
            rows,
        },
        report,
    )
}
