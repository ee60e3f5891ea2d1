// src/extract.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use crate::error::ExtractionError;
use crate::table::{RaceResultRow, ROW_WIDTH};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("results selector should parse")
}

static RESULTS_TABLE: Lazy<Selector> = Lazy::new(|| selector("table#results-table"));
static HEADER_ROW: Lazy<Selector> = Lazy::new(|| selector("thead tr"));
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| selector("th, td"));
static BODY_ROW: Lazy<Selector> = Lazy::new(|| selector("tbody > tr"));

/// Cell classes in row order: rank, name, gender, age, finish, pace, activity.
pub const FIELD_CLASSES: [&str; ROW_WIDTH] = [
    "athlete-rank",
    "athlete-name",
    "athlete-gender",
    "athlete-age",
    "finish-time",
    "finish-pace",
    "athlete-activity",
];

static FIELD_CELLS: Lazy<Vec<Selector>> = Lazy::new(|| {
    FIELD_CLASSES
        .iter()
        .map(|class| selector(&format!("td.{}", class)))
        .collect()
});

/// What one listing page contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Only populated for the first page.
    pub header: Option<Vec<String>>,
    pub rows: Vec<RaceResultRow>,
}

/// Trimmed, non-empty text nodes of `el`, joined by single spaces.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_header(table: ElementRef<'_>) -> Result<Vec<String>, ExtractionError> {
    let row = table
        .select(&HEADER_ROW)
        .next()
        .ok_or(ExtractionError::MissingHeader)?;

    let labels: Vec<String> = row
        .select(&HEADER_CELL)
        .map(cell_text)
        .filter(|label| !label.is_empty())
        .collect();

    if labels.len() != ROW_WIDTH {
        return Err(ExtractionError::HeaderWidth {
            expected: ROW_WIDTH,
            found: labels.len(),
        });
    }
    Ok(labels)
}

fn extract_row(row: ElementRef<'_>, idx: usize) -> Result<RaceResultRow, ExtractionError> {
    let mut values = FIELD_CLASSES
        .iter()
        .zip(FIELD_CELLS.iter())
        .map(|(&field, sel)| {
            row.select(sel)
                .next()
                .map(cell_text)
                .ok_or(ExtractionError::MissingField { row: idx, field })
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    // FIELD_CLASSES has ROW_WIDTH entries, so every `next()` below is populated.
    let mut next = || values.next().unwrap_or_default();
    Ok(RaceResultRow {
        rank: next(),
        name: next(),
        gender: next(),
        age: next(),
        finish: next(),
        pace: next(),
        activity: next(),
    })
}

/// Parse one listing page. The header is read only when `first_page` is set.
pub fn extract_page(markup: &str, first_page: bool) -> Result<ExtractedPage, ExtractionError> {
    let doc = Html::parse_document(markup);
    let table = doc
        .select(&RESULTS_TABLE)
        .next()
        .ok_or(ExtractionError::MissingContainer)?;

    let header = if first_page {
        Some(extract_header(table)?)
    } else {
        None
    };

    let rows = table
        .select(&BODY_ROW)
        .enumerate()
        .map(|(idx, row)| extract_row(row, idx))
        .collect::<Result<Vec<_>, _>>()?;

    trace!(rows = rows.len(), first_page, "extracted page");
    Ok(ExtractedPage { header, rows })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const HEADER: [&str; ROW_WIDTH] =
        ["Rank", "Name", "Gender", "Age", "Finish", "Pace", "Activity"];

    /// Render a results page in the shape the race listing uses.
    pub(crate) fn results_page(rows: &[(&str, &str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(rank, name, finish)| {
                format!(
                    r#"<tr>
  <td class="athlete-rank">{rank}</td>
  <td class="athlete-name"><a href="/athletes/1">{name}</a></td>
  <td class="athlete-gender">F</td>
  <td class="athlete-age">35-39</td>
  <td class="finish-time">{finish}</td>
  <td class="finish-pace">5:20 /km</td>
  <td class="athlete-activity"><a href="/activities/1">View</a></td>
</tr>"#
                )
            })
            .collect();

        format!(
            r#"<html><body>
<table class="table" id="results-table">
<thead>
<tr>
<th>Rank</th>
<th>Name</th>
<th>Gender</th>
<th>Age</th>
<th>Finish</th>
<th>Pace</th>
<th>Activity</th>
</tr>
</thead>
<tbody>
{body}
</tbody>
</table>
</body></html>"#
        )
    }

    #[test]
    fn first_page_reads_header_and_rows() {
        let html = results_page(&[("1", "Ann Runner", "2:10:05"), ("2", "Bo Pacer", "2:11:40")]);
        let page = extract_page(&html, true).unwrap();

        assert_eq!(page.header.unwrap(), HEADER.to_vec());
        assert_eq!(page.rows.len(), 2);
        let first = &page.rows[0];
        assert_eq!(first.rank, "1");
        assert_eq!(first.name, "Ann Runner");
        assert_eq!(first.gender, "F");
        assert_eq!(first.age, "35-39");
        assert_eq!(first.finish, "2:10:05");
        assert_eq!(first.pace, "5:20 /km");
        assert_eq!(first.activity, "View");
        assert_eq!(page.rows[1].name, "Bo Pacer");
    }

    #[test]
    fn later_pages_skip_header() {
        let html = results_page(&[("51", "Cy", "3:00:00")]);
        let page = extract_page(&html, false).unwrap();
        assert!(page.header.is_none());
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn blank_age_is_kept_as_empty_string() {
        let html = results_page(&[("1", "Ann", "3:00:00")]).replace("35-39", "  ");
        let page = extract_page(&html, false).unwrap();
        assert_eq!(page.rows[0].age, "");
    }

    #[test]
    fn missing_table_is_an_error() {
        let err = extract_page("<html><body><p>nothing</p></body></html>", true).unwrap_err();
        assert_eq!(err, ExtractionError::MissingContainer);
    }

    #[test]
    fn missing_cell_fails_closed() {
        let html = results_page(&[("1", "Ann", "3:00:00"), ("2", "Bo", "3:01:00")]);
        // drop the pace cell of every row
        let html = html.replace(r#"<td class="finish-pace">5:20 /km</td>"#, "");
        let err = extract_page(&html, false).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MissingField {
                row: 0,
                field: "finish-pace"
            }
        );
    }

    #[test]
    fn short_header_is_rejected() {
        let html = results_page(&[]).replace("<th>Activity</th>", "");
        let err = extract_page(&html, true).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::HeaderWidth {
                expected: ROW_WIDTH,
                found: ROW_WIDTH - 1
            }
        );
    }

    #[test]
    fn missing_header_on_first_page() {
        let html = r#"<table id="results-table"><tbody></tbody></table>"#;
        assert_eq!(
            extract_page(html, true).unwrap_err(),
            ExtractionError::MissingHeader
        );
        assert!(extract_page(html, false).unwrap().rows.is_empty());
    }

    #[test]
    fn empty_body_yields_no_rows() {
        let page = extract_page(&results_page(&[]), true).unwrap();
        assert!(page.header.is_some());
        assert!(page.rows.is_empty());
    }
}
