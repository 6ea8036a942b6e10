//! Catalog state: query text wired through the debouncer to the dispatcher.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::debounce::{DebounceConfig, DebouncedFn};
use crate::dispatcher::{SearchDispatcher, SearchOutcome, SearchState, TitleSearch};
use crate::render::{CatalogView, PageRounding};

/// Top-level catalog state: the query text plus the search pipeline behind it.
///
/// Query edits go through the debouncer and always restart at page 1. Page
/// navigation searches the current text right away.
pub struct Catalog<B: TitleSearch> {
    query: String,
    dispatcher: Arc<SearchDispatcher<B>>,
    debounced: DebouncedFn<String>,
    rounding: PageRounding,
}

impl<B: TitleSearch> Catalog<B> {
    /// Must be called from within a tokio runtime.
    pub fn new(backend: B, debounce: DebounceConfig, rounding: PageRounding) -> Self {
        let dispatcher = Arc::new(SearchDispatcher::new(backend));

        let debounced = DebouncedFn::spawn(debounce, {
            let dispatcher = dispatcher.clone();
            move |query: String| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher.search(&query, 1).await;
                });
            }
        });

        Catalog {
            query: String::new(),
            dispatcher,
            debounced,
            rounding,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the query text. A changed, non-empty text schedules a
    /// debounced search; an empty one leaves the current results alone.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.query {
            debug!("Query unchanged, nothing to search");
            return;
        }
        self.query = text;
        if self.query.is_empty() {
            debug!("Query cleared, keeping current results");
            return;
        }
        self.debounced.call(self.query.clone());
    }

    /// Search the current text at `page`, skipping the debouncer.
    pub fn paginate(&self, page: u32) -> JoinHandle<SearchOutcome> {
        let dispatcher = self.dispatcher.clone();
        let query = self.query.clone();
        tokio::spawn(async move { dispatcher.search(&query, page).await })
    }

    /// Set the query and search it immediately.
    pub async fn search_now(&mut self, query: impl Into<String>, page: u32) -> SearchOutcome {
        self.query = query.into();
        self.dispatcher.search(&self.query, page).await
    }

    pub fn cancel(&self) {
        self.dispatcher.cancel();
    }

    pub fn state(&self) -> SearchState {
        self.dispatcher.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.dispatcher.subscribe()
    }

    pub fn rounding(&self) -> PageRounding {
        self.rounding
    }

    pub fn view(&self) -> CatalogView {
        CatalogView::build(&self.query, &self.dispatcher.state(), self.rounding)
    }
}

/// One line typed in interactive mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    Page(u32),
    Quit,
    Invalid(String),
}

/// `:page N` and `:quit` are commands; any other line is the new query text.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.trim().to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("q" | "quit"), None) => Input::Quit,
        (Some("p" | "page"), Some(n)) => match n.parse::<u32>() {
            Ok(page) if page >= 1 => Input::Page(page),
            _ => Input::Invalid(format!("not a page number: {}", n)),
        },
        _ => Input::Invalid(format!("unknown command: {}", line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::FirstCall;
    use crate::dispatcher::tests::{page_of, FakeBackend};
    use crate::dispatcher::SearchPhase;
    use std::time::Duration;
    use tokio::time::sleep;

    fn catalog(first_call: FirstCall) -> (Catalog<FakeBackend>, FakeBackend) {
        let backend = FakeBackend::default();
        let config = DebounceConfig {
            delay: Duration::from_millis(1000),
            first_call,
        };
        (
            Catalog::new(backend.clone(), config, PageRounding::Truncate),
            backend,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_searches_the_latest_text_once() {
        let (mut catalog, backend) = catalog(FirstCall::Swallow);

        catalog.set_query("b");
        sleep(Duration::from_millis(100)).await;
        catalog.set_query("ba");
        sleep(Duration::from_millis(100)).await;
        catalog.set_query("bat");
        sleep(Duration::from_millis(3000)).await;

        assert_eq!(backend.requests(), vec!["start:bat:1"]);
        assert_eq!(catalog.state().results, Some(page_of("bat", 10, 45)));
    }

    #[tokio::test(start_paused = true)]
    async fn lone_first_edit_never_searches() {
        let (mut catalog, backend) = catalog(FirstCall::Swallow);

        catalog.set_query("heat");
        sleep(Duration::from_millis(5000)).await;

        assert!(backend.requests().is_empty());
        assert_eq!(catalog.view(), CatalogView::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_keeps_current_results() {
        let (mut catalog, backend) = catalog(FirstCall::Trailing);

        catalog.set_query("heat");
        sleep(Duration::from_millis(2000)).await;
        assert_eq!(backend.requests(), vec!["start:heat:1"]);

        catalog.set_query("");
        sleep(Duration::from_millis(3000)).await;

        assert_eq!(backend.requests(), vec!["start:heat:1"]);
        assert_eq!(catalog.state().results, Some(page_of("heat", 10, 45)));
    }

    #[tokio::test(start_paused = true)]
    async fn paginate_skips_the_debouncer() {
        let (mut catalog, backend) = catalog(FirstCall::Trailing);

        catalog.set_query("heat");
        sleep(Duration::from_millis(2000)).await;

        assert_eq!(catalog.paginate(3).await.unwrap(), SearchOutcome::Settled);
        assert_eq!(backend.requests(), vec!["start:heat:1", "start:heat:3"]);

        match catalog.view() {
            CatalogView::Results { pages, .. } => {
                let active: Vec<u32> = pages.iter().filter(|p| p.active).map(|p| p.number).collect();
                assert_eq!(active, vec![3]);
            }
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_results_show_the_empty_state() {
        let (mut catalog, _) = catalog(FirstCall::Swallow);

        assert_eq!(catalog.search_now("nothing", 1).await, SearchOutcome::Empty);

        assert_eq!(catalog.state().phase, SearchPhase::Empty);
        assert_eq!(catalog.view(), CatalogView::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_query_restarts_at_page_one() {
        let (mut catalog, backend) = catalog(FirstCall::Trailing);

        catalog.search_now("heat", 4).await;
        catalog.set_query("heat 2");
        sleep(Duration::from_millis(2000)).await;

        assert_eq!(backend.requests(), vec!["start:heat:4", "start:heat 2:1"]);
        assert_eq!(catalog.state().page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_query_keeps_the_current_page() {
        let (mut catalog, backend) = catalog(FirstCall::Trailing);

        catalog.set_query("heat");
        sleep(Duration::from_millis(2000)).await;
        catalog.paginate(3).await.unwrap();

        catalog.set_query("heat");
        sleep(Duration::from_millis(3000)).await;

        assert_eq!(backend.requests(), vec!["start:heat:1", "start:heat:3"]);
        assert_eq!(catalog.state().page, 3);
    }

    #[test]
    fn parses_interactive_input() {
        assert_eq!(parse_input("batman\n"), Input::Query("batman".to_string()));
        assert_eq!(parse_input(""), Input::Query(String::new()));
        assert_eq!(parse_input(":page 3"), Input::Page(3));
        assert_eq!(parse_input(":p 2"), Input::Page(2));
        assert_eq!(parse_input(":quit"), Input::Quit);
        assert_eq!(parse_input(":q"), Input::Quit);
        assert!(matches!(parse_input(":page 0"), Input::Invalid(_)));
        assert!(matches!(parse_input(":page x"), Input::Invalid(_)));
        assert!(matches!(parse_input(":frobnicate"), Input::Invalid(_)));
    }
}
