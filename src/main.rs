use clap::Parser;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{info, warn};

use movie_catalog::{
    parse_input, Args, Catalog, CatalogView, Input, OmdbClient, PageRounding, SearchOutcome,
    SearchState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Logs go to stderr so they never interleave with results
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    dotenv().ok();

    let args = Args::parse();
    let client = OmdbClient::new(&args)?;

    match args.query.clone() {
        Some(query) => one_shot(client, &args, query).await,
        None => interactive(client, &args).await,
    }
}

/// Spinner shown while a search is in flight.
fn loading_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

async fn one_shot(
    client: OmdbClient,
    args: &Args,
    query: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut catalog = Catalog::new(client, args.debounce_config(), args.page_rounding());

    let pb = loading_spinner(format!("Searching '{}' page {}", query, args.page));
    let outcome = catalog.search_now(query, args.page).await;
    pb.finish_and_clear();

    if outcome == SearchOutcome::Failed {
        return Err("search failed, see the log for details".into());
    }

    if args.json {
        let results = catalog.state().results.unwrap_or_default();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", catalog.view());
    }
    Ok(())
}

async fn interactive(client: OmdbClient, args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut catalog = Catalog::new(client, args.debounce_config(), args.page_rounding());
    let (query_tx, query_rx) = watch::channel(String::new());

    let renderer = tokio::spawn(render_updates(
        catalog.subscribe(),
        query_rx,
        catalog.rounding(),
    ));

    info!("Type a title to search. `:page N` switches pages, `:quit` exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Quit => break,
            Input::Page(page) => {
                if catalog.query().is_empty() {
                    warn!("Nothing to paginate yet");
                    continue;
                }
                // Detached: a newer search cancels it.
                drop(catalog.paginate(page));
            }
            Input::Query(text) => {
                query_tx.send_replace(text.clone());
                catalog.set_query(text);
            }
            Input::Invalid(reason) => warn!("{}", reason),
        }
    }

    catalog.cancel();
    renderer.abort();
    Ok(())
}

/// Print the view every time a search settles, with a spinner in between.
async fn render_updates(
    mut states: watch::Receiver<SearchState>,
    query: watch::Receiver<String>,
    rounding: PageRounding,
) {
    let mut spinner: Option<ProgressBar> = None;

    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        let query = query.borrow().clone();

        if state.loading {
            let message = format!("Searching '{}' page {}", query, state.page);
            match &spinner {
                Some(pb) => pb.set_message(message),
                None => spinner = Some(loading_spinner(message)),
            }
            continue;
        }

        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
        print!("{}", CatalogView::build(&query, &state, rounding));
    }
}
