use clap::Parser;

use crate::debounce::{DebounceConfig, FirstCall};
use crate::omdb_client::DEFAULT_ENDPOINT;
use crate::render::PageRounding;

/// Movie catalog: search movie titles on OMDb from the terminal, with
/// debounced type-ahead and cancellation of superseded searches.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Search movie titles on OMDb. Pass a query for a one-shot search, or run without one \
                  to type queries interactively: every line replaces the search text, `:page N` \
                  switches pages and `:quit` exits."
)]
pub struct Args {
    /// Title to search for. Starts interactive mode when omitted.
    pub query: Option<String>,

    /// Page to fetch for a one-shot search.
    #[clap(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// OMDb API key. Falls back to OMDB_API_KEY, then to the built-in demo key.
    #[clap(short = 'k', long)]
    pub api_key: Option<String>,

    /// Search endpoint.
    #[clap(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Quiet period, in milliseconds, before an edited query is searched.
    #[clap(short, long, value_name = "MS", default_value = "1000")]
    pub delay_ms: u64,

    /// Search the first edit after a quiet period too, once the delay has
    /// passed. By default that edit only arms the debouncer.
    #[clap(long)]
    pub fire_first_call: bool,

    /// Count a trailing partial page when building page controls.
    #[clap(long)]
    pub round_up_pages: bool,

    /// Print the raw result envelope as JSON (one-shot mode only).
    #[clap(long)]
    pub json: bool,
}

impl Args {
    pub fn debounce_config(&self) -> DebounceConfig {
        DebounceConfig {
            delay: std::time::Duration::from_millis(self.delay_ms),
            first_call: if self.fire_first_call {
                FirstCall::Trailing
            } else {
                FirstCall::Swallow
            },
        }
    }

    pub fn page_rounding(&self) -> PageRounding {
        if self.round_up_pages {
            PageRounding::Ceil
        } else {
            PageRounding::Truncate
        }
    }
}
