//! Turning fetched data into something to print.

use std::fmt;

use crate::dispatcher::SearchState;
use crate::models::MovieItem;

/// How a trailing partial page is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRounding {
    /// `total / per_page`, truncated. 45 results at 10 a page gives 4 pages;
    /// the last five results have no control.
    #[default]
    Truncate,
    /// `ceil(total / per_page)`.
    Ceil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    pub number: u32,
    pub active: bool,
}

/// Most page controls ever built. OMDb serves at most 100 pages per query,
/// and the total comes from the response, so it is not trusted beyond that.
pub const MAX_PAGE_CONTROLS: u64 = 100;

/// Page controls for `total` results shown `per_page` at a time.
///
/// The page size is whatever the current page holds, so an empty page
/// yields no controls. At most [`MAX_PAGE_CONTROLS`] are returned.
pub fn page_controls(total: u64, per_page: usize, current: u32, rounding: PageRounding) -> Vec<PageControl> {
    if per_page == 0 {
        return Vec::new();
    }

    let per_page = per_page as u64;
    let count = match rounding {
        PageRounding::Truncate => total / per_page,
        PageRounding::Ceil => total.div_ceil(per_page),
    };
    let count = count.min(MAX_PAGE_CONTROLS) as u32;

    (1..=count)
        .map(|number| PageControl {
            number,
            active: number == current,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: String,
    pub poster: String,
    pub labels: Vec<String>,
}

pub fn result_rows(items: &[MovieItem]) -> Vec<ResultRow> {
    items
        .iter()
        .map(|item| ResultRow {
            id: item.id.clone(),
            poster: item.poster.clone(),
            labels: vec![
                format!("Name: {}", item.title),
                format!("Year: {}", item.year),
                format!("imdbID: {}", item.id),
                format!("Type: {}", item.category),
            ],
        })
        .collect()
}

pub fn summary_line(query: &str, total: u64) -> String {
    format!("You searched for: {}, {} results found", query, total)
}

/// What the catalog shows for a given query and dispatcher state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView {
    /// Nothing searched yet, or an empty query over an empty result.
    Idle,
    Loading,
    /// A non-empty query matched nothing. No paginator.
    Empty,
    Results {
        summary: String,
        rows: Vec<ResultRow>,
        pages: Vec<PageControl>,
    },
}

impl CatalogView {
    pub fn build(query: &str, state: &SearchState, rounding: PageRounding) -> Self {
        if state.loading {
            return CatalogView::Loading;
        }

        let Some(results) = &state.results else {
            return CatalogView::Idle;
        };

        if results.total_count == 0 {
            return if query.is_empty() {
                CatalogView::Idle
            } else {
                CatalogView::Empty
            };
        }

        CatalogView::Results {
            summary: summary_line(query, results.total_count),
            rows: result_rows(&results.items),
            pages: page_controls(results.total_count, results.items.len(), state.page, rounding),
        }
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogView::Idle => Ok(()),
            CatalogView::Loading => writeln!(f, "LOADING"),
            CatalogView::Empty => writeln!(f, "No results found"),
            CatalogView::Results { summary, rows, pages } => {
                writeln!(f, "{}", summary)?;
                for row in rows {
                    writeln!(f)?;
                    for label in &row.labels {
                        writeln!(f, "  {}", label)?;
                    }
                    writeln!(f, "  Poster: {}", row.poster)?;
                }
                if !pages.is_empty() {
                    writeln!(f)?;
                    let controls: Vec<String> = pages
                        .iter()
                        .map(|p| {
                            if p.active {
                                format!("[{}]", p.number)
                            } else {
                                p.number.to_string()
                            }
                        })
                        .collect();
                    writeln!(f, "Pages: {}", controls.join(" "))?;
                }
                Ok(())
            }
        }
    }
}
