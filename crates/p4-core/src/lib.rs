//! Core domain models and state machines for the Planet 4 search page and
//! archive picker
//!
//! This crate contains:
//! - Search filters and form submission (FilterSet, SearchForm)
//! - The incremental results loader (LoaderMachine, PageSequence)
//! - Media items, selection algebra and the picker grid (GridState)
//!
//! Nothing here performs I/O; fetching lives in `p4-sources` and the async
//! drivers in `p4-engine`.

pub mod error;
pub mod filter;
pub mod grid;
pub mod loader;
pub mod media;
pub mod page;
pub mod selection;

pub use error::{Error, Result};
pub use filter::{Filter, FilterSet, FormEvent, SearchForm, SortKey, Submission};
pub use grid::{GridScroll, GridState, GridView, PageRequest, SelectionChanged};
pub use loader::{
    FetchTicket, ListingContext, LoadTrigger, LoaderMachine, LoaderSettings, LoaderState,
    LoaderView, PageView, Resolution, ScrollMetrics, ScrollOutcome,
};
pub use media::{ImageSize, MediaItem, RenderOptions, Tile};
pub use page::{PageSequence, ResultPage};
pub use selection::{Modifiers, SelectionState, range_fill};
