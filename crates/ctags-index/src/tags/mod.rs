//! Tag table format: line records, location hints, and offset-tracking
//! line streaming.

mod hint;
mod record;
mod stream;

pub use hint::LocationHint;
pub use record::{PSEUDO_TAG_PREFIX, TagRecord, parse_line};
pub use stream::{LineStream, TableLine};
