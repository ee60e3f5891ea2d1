// src/table.rs

use chrono::NaiveTime;
use serde::Serialize;

/// Label of the column `clean` appends to the header.
pub const FINISH_MINUTES_COLUMN: &str = "Finish (mins)";

/// Number of fields every athlete row carries.
pub const ROW_WIDTH: usize = 7;

/// One athlete's line in a results listing, exactly as the page rendered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceResultRow {
    pub rank: String,
    pub name: String,
    pub gender: String,
    /// Blank when the athlete did not publish an age group.
    pub age: String,
    pub finish: String,
    pub pace: String,
    pub activity: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ResultsTable {
    /// Column labels, taken from the first page. `None` when no page was fetched.
    pub header: Option<Vec<String>>,
    /// Rows in page order, then document order within a page.
    pub rows: Vec<RaceResultRow>,
}

impl ResultsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A row that survived cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRow {
    pub raw: RaceResultRow,
    pub finish_time: NaiveTime,
    pub finish_minutes: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CleanedResultsTable {
    pub header: Option<Vec<String>>,
    pub rows: Vec<CleanedRow>,
}

impl CleanedResultsTable {
    /// Header labels followed by the derived minutes column.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = self.header.clone().unwrap_or_default();
        cols.push(FINISH_MINUTES_COLUMN.to_string());
        cols
    }

    /// The float-minutes column, in row order.
    pub fn finish_minutes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.finish_minutes).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
