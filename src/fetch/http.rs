// src/fetch/http.rs

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::{PageOutcome, PageSource};
use crate::error::FetchError;

const PAGE_PARAM: &str = "page";

/// Build the URL of listing page `page`: `base` with its `page` query
/// parameter set, every other parameter kept in order.
pub fn page_url(base: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// Maps a response status to "keep going", "stop" or "fail".
fn classify_status(status: StatusCode) -> Option<PageOutcome> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        Some(PageOutcome::EndOfData)
    } else {
        Some(PageOutcome::FetchError(FetchError::Status(status)))
    }
}

/// Fetches listing pages over HTTP, one GET per call.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    base: Url,
}

impl HttpPageSource {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    async fn get_page(&self, page: u32) -> PageOutcome {
        let url = page_url(&self.base, page);
        debug!(%url, "GET");

        let resp = match self.client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%url, error = %e, "request failed");
                return PageOutcome::FetchError(e.into());
            }
        };

        if let Some(outcome) = classify_status(resp.status()) {
            debug!(%url, status = %resp.status(), "page not served");
            return outcome;
        }

        match resp.text().await {
            Ok(body) if body.trim().is_empty() => PageOutcome::EndOfData,
            Ok(body) => PageOutcome::Page(body),
            Err(e) => {
                warn!(%url, error = %e, "reading body failed");
                PageOutcome::FetchError(e.into())
            }
        }
    }
}

impl PageSource for HttpPageSource {
    async fn fetch(&self, page: u32) -> PageOutcome {
        self.get_page(page).await
    }
}
