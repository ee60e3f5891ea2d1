pub mod clean;
pub mod finish_parser;
pub mod time_codec;

pub use clean::{clean, CleaningReport};
pub use finish_parser::parse_finish;
pub use time_codec::{from_minutes, time_to_minutes, to_minutes};
