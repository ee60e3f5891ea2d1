// src/fetch/mod.rs

use std::future::Future;

use crate::error::FetchError;

pub mod http;

pub use http::{page_url, HttpPageSource};

/// What a single page request produced.
#[derive(Debug)]
pub enum PageOutcome {
    /// Raw markup of the page, unparsed.
    Page(String),
    /// The listing has no page at this index.
    EndOfData,
    /// The request failed; the listing may or may not continue.
    FetchError(FetchError),
}

/// Something that can hand out listing pages by 1-based index.
pub trait PageSource {
    fn fetch(&self, page: u32) -> impl Future<Output = PageOutcome> + Send;
}
