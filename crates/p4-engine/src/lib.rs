//! Async drivers for the search results loader and the archive picker
//!
//! Each driver owns its state machine from `p4-core` and a source from
//! `p4-sources`. Methods take `&mut self`, so a driver never has more than
//! one fetch in flight.

pub mod loader;
pub mod picker;

pub use loader::{LoadOutcome, ResultsLoader, SearchContext};
pub use picker::{ArchivePicker, PickerSettings};
