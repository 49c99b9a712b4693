pub mod types;

pub use types::{CatalogEntry, EntryOutcome, RawRatingRow};
