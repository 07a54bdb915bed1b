use std::time::Instant;

use p4_core::{
    FetchTicket, ListingContext, LoaderMachine, LoaderSettings, LoaderState, LoaderView,
    Resolution, ResultPage, ScrollMetrics, SortKey,
};
use p4_sources::{ListingRequest, ListingSource};
use tracing::{debug, info, warn};

/// Search inputs every page request repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    pub query: String,
    pub sort: SortKey,
    /// Decoded query string of the current location.
    pub query_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was started.
    Idle,
    Appended { page_number: u32 },
    Failed { reason: String },
    Discarded,
}

/// Drives a [`LoaderMachine`] against a listing source.
pub struct ResultsLoader<S> {
    source: S,
    machine: LoaderMachine,
    search: SearchContext,
}

impl<S: ListingSource> ResultsLoader<S> {
    /// Attach to a search page. Returns `None` when the page carries no
    /// usable load-more control, in which case the feature stays off.
    pub fn mount(
        source: S,
        context: Option<ListingContext>,
        search: SearchContext,
        settings: LoaderSettings,
    ) -> Option<Self> {
        let Some(context) = context else {
            debug!("no load-more control on this page, results loader disabled");
            return None;
        };
        match LoaderMachine::new(context, settings) {
            Ok(machine) => {
                debug!(session = %machine.session(), ?context, "results loader mounted");
                Some(Self {
                    source,
                    machine,
                    search,
                })
            }
            Err(e) => {
                debug!(error = %e, "results loader disabled");
                None
            }
        }
    }

    pub fn state(&self) -> &LoaderState {
        self.machine.state()
    }

    pub fn pages(&self) -> &[ResultPage] {
        self.machine.pages()
    }

    pub fn view(&self) -> LoaderView {
        self.machine.view()
    }

    pub fn search(&self) -> &SearchContext {
        &self.search
    }

    pub async fn on_scroll(&mut self, metrics: ScrollMetrics) -> LoadOutcome {
        self.on_scroll_at(metrics, Instant::now()).await
    }

    pub async fn on_scroll_at(&mut self, metrics: ScrollMetrics, now: Instant) -> LoadOutcome {
        let outcome = self.machine.on_scroll(metrics, now);
        if outcome.revealed > 0 {
            debug!(revealed = outcome.revealed, "revealed prefetched pages");
        }
        match outcome.ticket {
            Some(ticket) => self.run(ticket).await,
            None => LoadOutcome::Idle,
        }
    }

    /// Explicit load-more click.
    pub async fn load_more(&mut self) -> LoadOutcome {
        match self.machine.click() {
            Some(ticket) => self.run(ticket).await,
            None => LoadOutcome::Idle,
        }
    }

    async fn run(&mut self, ticket: FetchTicket) -> LoadOutcome {
        let request = ListingRequest::new(
            &self.search.query,
            self.search.sort,
            ticket.page(),
            self.search.query_string.clone(),
        );
        let fetched = self.source.fetch_page(&request).await;

        match self.machine.resolve(&ticket, fetched, Instant::now()) {
            Resolution::Appended { page_number } => {
                info!(
                    page = page_number,
                    trigger = ?ticket.trigger(),
                    hidden_control = self.machine.view().load_more_hidden,
                    "appended results page"
                );
                LoadOutcome::Appended { page_number }
            }
            Resolution::Failed(e) => {
                warn!(page = ticket.page(), error = %e, "failed to load results page");
                LoadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Resolution::Discarded => {
                debug!(page = ticket.page(), "discarded stale results page");
                LoadOutcome::Discarded
            }
        }
    }

    /// Detach from the page; nothing is appended afterwards.
    pub fn unmount(&mut self) {
        self.machine.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use p4_sources::MemoryListingSource;

    use super::*;

    fn search() -> SearchContext {
        SearchContext {
            query: " plastic ".to_string(),
            sort: SortKey::Date,
            query_string: "s=plastic&orderby=post_date".to_string(),
        }
    }

    fn context(total: u32, per_page: u32, cap: u32) -> Option<ListingContext> {
        Some(ListingContext {
            total_results: total,
            per_page,
            current_page: 1,
            auto_load_cap: cap,
        })
    }

    fn source(pages: u32) -> MemoryListingSource {
        (2..=pages).fold(MemoryListingSource::new(), |s, p| {
            s.with_page(p, format!("<li class=\"row-hidden\">page {}</li>", p))
        })
    }

    fn at_control() -> ScrollMetrics {
        ScrollMetrics {
            scroll_y: 3000.0,
            viewport_height: 1000.0,
            control_top: 3500.0,
            control_height: 60.0,
        }
    }

    #[test]
    fn test_mount_without_control_disables_loader() {
        let loader = ResultsLoader::mount(source(3), None, search(), LoaderSettings::default());
        assert!(loader.is_none());

        let broken = context(10, 0, 1);
        assert!(ResultsLoader::mount(source(3), broken, search(), LoaderSettings::default()).is_none());
    }

    #[tokio::test]
    async fn test_load_more_end_to_end() {
        let source = Arc::new(source(3));
        let mut loader =
            ResultsLoader::mount(source.clone(), context(10, 4, 5), search(), LoaderSettings::default())
                .unwrap();

        assert_eq!(loader.load_more().await, LoadOutcome::Appended { page_number: 2 });
        assert!(!loader.view().load_more_hidden);
        assert_eq!(loader.load_more().await, LoadOutcome::Appended { page_number: 3 });
        assert!(loader.view().load_more_hidden);
        assert_eq!(loader.load_more().await, LoadOutcome::Idle);

        let requests = source.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].query, "plastic");
        assert_eq!(requests[0].sort, SortKey::Date);
        assert_eq!(requests[1].page, 3);
        assert_eq!(requests[1].query_string, "s=plastic&orderby=post_date");
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retryable() {
        let source = Arc::new(source(5));
        let mut loader =
            ResultsLoader::mount(source.clone(), context(100, 10, 3), search(), LoaderSettings::default())
                .unwrap();

        source.fail_once(2).await;
        let outcome = loader.on_scroll(at_control()).await;
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        assert_eq!(loader.state().auto_load_count, 0);
        assert!(!loader.state().is_fetch_in_flight);
        assert!(loader.pages().is_empty());

        assert_eq!(loader.load_more().await, LoadOutcome::Appended { page_number: 2 });
    }

    #[tokio::test]
    async fn test_scroll_loads_complete_one_at_a_time() {
        let source = Arc::new(
            source(4)
                .with_latency(2, Duration::from_millis(40))
                .with_latency(3, Duration::from_millis(1)),
        );
        let settings = LoaderSettings {
            throttle: Duration::ZERO,
            ..LoaderSettings::default()
        };
        let mut loader =
            ResultsLoader::mount(source.clone(), context(100, 10, 3), search(), settings).unwrap();

        for expected in 2..=4 {
            assert_eq!(
                loader.on_scroll(at_control()).await,
                LoadOutcome::Appended { page_number: expected }
            );
            // The slow page resolved before the next request went out.
            assert!(!loader.state().is_fetch_in_flight);
            assert_eq!(source.requests().await.len() as u32, expected - 1);
        }
        let requested: Vec<u32> = source.requests().await.iter().map(|r| r.page).collect();
        assert_eq!(requested, vec![2, 3, 4]);
        assert_eq!(loader.state().auto_load_count, 3);
        assert_eq!(loader.on_scroll(at_control()).await, LoadOutcome::Idle);
    }

    #[tokio::test]
    async fn test_unmounted_loader_is_inert() {
        let mut loader =
            ResultsLoader::mount(source(3), context(100, 10, 3), search(), LoaderSettings::default())
                .unwrap();
        loader.unmount();
        assert_eq!(loader.load_more().await, LoadOutcome::Idle);
        assert_eq!(loader.on_scroll(at_control()).await, LoadOutcome::Idle);
    }
}
