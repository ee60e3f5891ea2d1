pub mod collect;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod plot;
pub mod process;
pub mod stats;
pub mod table;

pub use config::RunConfig;
pub use error::{ConfigError, ExtractionError, FetchError, StatsError};
pub use fetch::{HttpPageSource, PageOutcome, PageSource};
pub use pipeline::{run, RaceReport};
pub use table::{CleanedResultsTable, RaceResultRow, ResultsTable};
