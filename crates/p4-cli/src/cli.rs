use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "p4")]
#[command(about = "Drive the Planet 4 search loader and archive picker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search results page
    #[command(subcommand)]
    Search(SearchCommands),

    /// Archive media picker
    #[command(subcommand)]
    Picker(PickerCommands),
}

#[derive(Subcommand)]
pub enum SearchCommands {
    /// Print the navigation URL a filter or sort change submits
    Url {
        /// Search query
        query: String,

        /// Active filter as group:name:id (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// relevance or date
        #[arg(long, default_value = "relevance")]
        sort: String,

        /// Remove the active filter with this id
        #[arg(long)]
        remove: Option<String>,

        /// Clear all filters
        #[arg(long)]
        clear: bool,
    },

    /// Load more result pages through the listing endpoint
    More {
        /// Search query
        query: String,

        /// Total number of results reported by the page
        #[arg(long)]
        total: u32,

        /// Results per page
        #[arg(long)]
        per_page: u32,

        /// Server-rendered page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Number of load-more clicks to perform
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Active filter as group:name:id (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// relevance or date
        #[arg(long, default_value = "relevance")]
        sort: String,

        /// Print the fetched markup
        #[arg(long)]
        html: bool,

        /// Override the configured ajax endpoint
        #[arg(long)]
        ajax_url: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PickerCommands {
    /// Fetch media pages and apply click gestures
    List {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Click gesture: INDEX, ctrl:INDEX, cmd:INDEX or shift:INDEX (repeatable)
        #[arg(long = "click")]
        clicks: Vec<String>,

        /// Enable bulk selection mode before clicking
        #[arg(long)]
        bulk: bool,

        /// Print the grid as JSON
        #[arg(long)]
        json: bool,

        /// Override the configured ajax endpoint
        #[arg(long)]
        ajax_url: Option<String>,
    },
}
