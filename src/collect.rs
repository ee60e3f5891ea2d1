// src/collect.rs

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::extract::extract_page;
use crate::fetch::{PageOutcome, PageSource};
use crate::table::ResultsTable;

/// Walk the listing from page 1 until the source reports the end, or
/// `max_pages` pages have been read.
///
/// A fetch error aborts the walk instead of truncating the table, and so does
/// a page that is not a results listing.
#[instrument(level = "info", skip(source))]
pub async fn collect_results<S: PageSource>(source: &S, max_pages: u32) -> Result<ResultsTable> {
    let mut table = ResultsTable::default();

    for page in 1..=max_pages {
        let markup = match source.fetch(page).await {
            PageOutcome::Page(markup) => markup,
            PageOutcome::EndOfData => {
                info!(page, "end of listing");
                break;
            }
            PageOutcome::FetchError(e) => {
                return Err(e).with_context(|| format!("fetching results page {}", page));
            }
        };

        let extracted = extract_page(&markup, page == 1)
            .with_context(|| format!("extracting results page {}", page))?;

        if page == 1 {
            table.header = extracted.header;
        }

        if extracted.rows.is_empty() {
            info!(page, "page has no rows; end of listing");
            break;
        }

        debug!(page, rows = extracted.rows.len(), "page collected");
        table.rows.extend(extracted.rows);

        if page == max_pages {
            warn!(max_pages, "stopped at page limit; listing may continue");
        }
    }

    info!(rows = table.rows.len(), "collected results");
    Ok(table)
}
