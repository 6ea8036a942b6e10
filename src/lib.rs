//! # Movie Catalog
//!
//! Type-ahead movie title search against the OMDb API: query edits are
//! debounced, every new search cancels the one still in flight, and results
//! are rendered as a list with page controls.
//!
//! ## Main Components
//!
//! - [`Debouncer`] / [`DebouncedFn`]: collapse bursts of edits into one call
//! - [`SearchDispatcher`]: owns the single in-flight request and its state
//! - [`Catalog`]: query text wired through the debouncer to the dispatcher
//! - [`OmdbClient`]: the HTTP backend
//! - [`Args`]: command line arguments
//!
//! ## Example
//!
//! ```no_run
//! use clap::Parser;
//! use movie_catalog::{Args, Catalog, OmdbClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let args = Args::parse();
//!     let client = OmdbClient::new(&args)?;
//!
//!     let mut catalog = Catalog::new(client, args.debounce_config(), args.page_rounding());
//!     catalog.search_now("batman", 1).await;
//!     print!("{}", catalog.view());
//!
//!     Ok(())
//! }
//! ```

mod args;
mod catalog;
mod debounce;
mod dispatcher;
mod error;
mod models;
mod omdb_client;
mod render;

// Re-export main components for documentation and external use
pub use crate::args::Args;
pub use crate::catalog::{parse_input, Catalog, Input};
pub use crate::debounce::{DebounceConfig, DebouncedFn, Debouncer, FirstCall, DEFAULT_DELAY};
pub use crate::dispatcher::{
    RequestToken, SearchDispatcher, SearchOutcome, SearchPhase, SearchState, TitleSearch,
};
pub use crate::error::SearchError;
pub use crate::models::{MovieItem, SearchEnvelope};
pub use crate::omdb_client::{OmdbClient, DEFAULT_API_KEY, DEFAULT_ENDPOINT};
pub use crate::render::{
    page_controls, result_rows, summary_line, CatalogView, PageControl, PageRounding, ResultRow,
    MAX_PAGE_CONTROLS,
};
