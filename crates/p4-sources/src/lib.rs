//! Boundary to the site's listing and media endpoints

pub mod handler;
pub mod listing;
pub mod media;
pub mod memory;

pub use handler::{HttpOptions, ListingRequest, ListingSource, MediaSource};
pub use listing::{HttpListingSource, location_query};
pub use media::HttpMediaSource;
pub use memory::{MemoryListingSource, MemoryMediaSource};
