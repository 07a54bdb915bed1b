//! Incremental results loader state machine
//!
//! Pure state: callers feed scroll metrics, clicks and fetch outcomes in,
//! and read a [`LoaderView`] back out. Time is passed in explicitly so the
//! throttle window is deterministic.
//!
//! ```text
//! Idle --(scroll past threshold, quota left, not throttled)--> Fetching
//! Idle --(load-more click)-----------------------------------> Fetching
//! Fetching --(html)--> append page, current_page += 1 --------> Idle
//! Fetching --(error)-> counters untouched --------------------> Idle
//! ```

use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::page::{PageSequence, ResultPage};
use crate::{Error, Result};

/// Tunables that are not supplied by the page itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    /// Cooldown after a scroll-triggered page lands.
    pub throttle: Duration,
    /// Start prefetching this many pixels before the load-more control.
    pub load_earlier_offset: f64,
    /// Reveal prefetched pages this many pixels before the control.
    pub reveal_offset: f64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(500),
            load_earlier_offset: 250.0,
            reveal_offset: 0.0,
        }
    }
}

/// Constants the server renders onto the load-more control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingContext {
    pub total_results: u32,
    pub per_page: u32,
    /// Page that was server rendered.
    pub current_page: u32,
    /// Maximum number of scroll-triggered loads per page view.
    pub auto_load_cap: u32,
}

impl ListingContext {
    fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            return Err(Error::InvalidInput("per_page must be positive".to_string()));
        }
        if self.current_page == 0 {
            return Err(Error::InvalidInput("current_page must be positive".to_string()));
        }
        Ok(())
    }
}

/// Window and control geometry at the time of a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub control_top: f64,
    pub control_height: f64,
}

impl ScrollMetrics {
    /// Whether the viewport bottom is within `offset` pixels of the control's bottom edge.
    pub fn past(&self, offset: f64) -> bool {
        self.scroll_y > self.control_top + self.control_height - self.viewport_height - offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTrigger {
    Scroll,
    Click,
}

/// Handle for one outstanding fetch. Only the ticket currently in flight
/// can resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    session: Uuid,
    page: u32,
    trigger: LoadTrigger,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn trigger(&self) -> LoadTrigger {
        self.trigger
    }
}

/// Counters for the auto-load feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderState {
    pub auto_load_count: u32,
    pub auto_load_cap: u32,
    pub is_fetch_in_flight: bool,
    pub current_page: u32,
}

#[derive(Debug)]
pub enum Resolution {
    Appended { page_number: u32 },
    Failed(Error),
    /// Ticket was stale or the loader was unmounted.
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub ticket: Option<FetchTicket>,
    pub revealed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub page_number: u32,
    pub hidden: bool,
}

/// DOM projection of the loader state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderView {
    pub load_more_hidden: bool,
    pub loading: bool,
    pub pages: Vec<PageView>,
}

#[derive(Debug)]
pub struct LoaderMachine {
    session: Uuid,
    settings: LoaderSettings,
    total_results: u32,
    per_page: u32,
    state: LoaderState,
    in_flight: Option<FetchTicket>,
    throttle_until: Option<Instant>,
    pages: PageSequence,
    mounted: bool,
}

impl LoaderMachine {
    pub fn new(context: ListingContext, settings: LoaderSettings) -> Result<Self> {
        context.validate()?;
        Ok(Self {
            session: Uuid::new_v4(),
            settings,
            total_results: context.total_results,
            per_page: context.per_page,
            state: LoaderState {
                auto_load_count: 0,
                auto_load_cap: context.auto_load_cap,
                is_fetch_in_flight: false,
                current_page: context.current_page,
            },
            in_flight: None,
            throttle_until: None,
            pages: PageSequence::new(context.current_page),
            mounted: true,
        })
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn pages(&self) -> &[ResultPage] {
        self.pages.pages()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True while pages beyond `current_page` exist.
    pub fn has_more(&self) -> bool {
        u64::from(self.state.current_page) * u64::from(self.per_page)
            < u64::from(self.total_results)
    }

    fn throttled(&self, now: Instant) -> bool {
        self.throttle_until.is_some_and(|until| now < until)
    }

    fn can_auto_load(&self, now: Instant) -> bool {
        self.mounted
            && self.in_flight.is_none()
            && self.state.auto_load_count < self.state.auto_load_cap
            && !self.throttled(now)
            && self.has_more()
    }

    fn start(&mut self, trigger: LoadTrigger) -> FetchTicket {
        let ticket = FetchTicket {
            session: self.session,
            page: self.state.current_page + 1,
            trigger,
        };
        self.in_flight = Some(ticket.clone());
        self.state.is_fetch_in_flight = true;
        ticket
    }

    /// Handle a window scroll: reveal prefetched pages and maybe start an auto-load.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> ScrollOutcome {
        if !self.mounted {
            return ScrollOutcome::default();
        }

        let revealed = if metrics.past(self.settings.reveal_offset) {
            self.pages.reveal_all()
        } else {
            0
        };

        let ticket = if self.can_auto_load(now) && metrics.past(self.settings.load_earlier_offset)
        {
            Some(self.start(LoadTrigger::Scroll))
        } else {
            None
        };

        ScrollOutcome { ticket, revealed }
    }

    /// Handle a load-more click. Ignores the quota and the scroll position,
    /// but never starts a second concurrent fetch.
    pub fn click(&mut self) -> Option<FetchTicket> {
        if !self.mounted || self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        Some(self.start(LoadTrigger::Click))
    }

    /// Feed the outcome of the fetch behind `ticket`.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<String>,
        now: Instant,
    ) -> Resolution {
        if !self.mounted || self.in_flight.as_ref() != Some(ticket) {
            return Resolution::Discarded;
        }
        self.in_flight = None;
        self.state.is_fetch_in_flight = false;

        let html = match outcome {
            Ok(html) => html,
            Err(e) => return Resolution::Failed(e),
        };

        let mut page = ResultPage::new(ticket.page, html);
        page.is_revealed = ticket.trigger == LoadTrigger::Click;
        if let Err(e) = self.pages.offer(page) {
            return Resolution::Failed(e);
        }

        self.state.current_page = ticket.page;
        if ticket.trigger == LoadTrigger::Scroll {
            self.state.auto_load_count += 1;
            self.throttle_until = Some(now + self.settings.throttle);
        }

        Resolution::Appended {
            page_number: ticket.page,
        }
    }

    /// Detach from the page. Later resolutions are discarded.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = None;
        self.state.is_fetch_in_flight = false;
    }

    pub fn view(&self) -> LoaderView {
        LoaderView {
            load_more_hidden: !self.has_more(),
            loading: self.state.is_fetch_in_flight,
            pages: self
                .pages
                .pages()
                .iter()
                .map(|p| PageView {
                    page_number: p.page_number,
                    hidden: !p.is_revealed,
                })
                .collect(),
        }
    }
}
