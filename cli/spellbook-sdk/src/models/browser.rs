//! The card grid: which page of which search is shown, and what it holds.
//!
//! Every fetch is tagged with a sequence number.
//! Only the result of the most recently started fetch is ever applied,
//! responses to superseded requests are dropped when they arrive.

use std::num::NonZeroU32;

use spellbook_catalog::types::{Card, CardQuery, CardsPage, FilterCriteria, PageSize};
use spellbook_catalog::{CatalogClientError, ClientTrait};
use tracing::{debug, instrument};

use super::page::PageWindow;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BrowseState {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Loaded(CardsPage),
    /// The last fetch failed with the given user facing message
    Failed(String),
}

/// Handle to a fetch in flight, required to apply its result.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct FetchTicket {
    sequence: u64,
    query: CardQuery,
}

impl FetchTicket {
    /// The query as it was when the fetch started
    pub fn query(&self) -> &CardQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogBrowser {
    window: PageWindow,
    criteria: FilterCriteria,
    state: BrowseState,
    latest_sequence: u64,
}

impl CatalogBrowser {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            window: PageWindow::new(page_size),
            ..Default::default()
        }
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn state(&self) -> &BrowseState {
        &self.state
    }

    /// The query describing what should currently be shown
    pub fn query(&self) -> CardQuery {
        CardQuery::new(
            self.window.page(),
            self.window.page_size(),
            self.criteria.clone(),
        )
    }

    /// Start a fetch of the current query, superseding any fetch in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_sequence += 1;
        self.state = BrowseState::Loading;
        let ticket = FetchTicket {
            sequence: self.latest_sequence,
            query: self.query(),
        };
        debug!(sequence = ticket.sequence, query = ?ticket.query, "started card fetch");
        ticket
    }

    /// Apply the outcome of a fetch.
    ///
    /// Returns false, leaving the state untouched,
    /// if a newer fetch was started after `ticket` was issued.
    /// A failure replaces any previously loaded cards.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<CardsPage, CatalogClientError>,
    ) -> bool {
        if ticket.sequence != self.latest_sequence {
            debug!(
                sequence = ticket.sequence,
                latest = self.latest_sequence,
                "discarding stale card fetch"
            );
            return false;
        }

        self.state = match result {
            Ok(page) => {
                debug!(cards = page.results.len(), count = ?page.count, "loaded cards");
                BrowseState::Loaded(page)
            },
            Err(err) => {
                debug!(error = %err, status = ?err.status(), "card fetch failed");
                BrowseState::Failed(err.user_message())
            },
        };
        true
    }

    /// Fetch the current query and apply the result.
    #[instrument(skip_all, fields(page = %self.window.page()))]
    pub async fn refresh(&mut self, client: &impl ClientTrait) -> bool {
        let ticket = self.begin_fetch();
        let result = client.search_cards(ticket.query()).await;
        self.complete_fetch(ticket, result)
    }

    pub fn set_page(&mut self, page: NonZeroU32) {
        self.window.go_to(page);
    }

    pub fn next_page(&mut self) {
        self.window.next();
    }

    pub fn previous_page(&mut self) {
        self.window.previous();
    }

    /// Change the page size, the page number is kept
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.window.set_page_size(page_size);
    }

    /// Replace the criteria and go back to the first page.
    ///
    /// A previous failure is cleared so it isn't shown next to the new search.
    pub fn submit_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.window.reset();
        if matches!(self.state, BrowseState::Failed(_)) {
            self.state = BrowseState::Idle;
        }
    }

    /// The cards currently shown, empty unless a page is loaded
    pub fn cards(&self) -> &[Card] {
        match &self.state {
            BrowseState::Loaded(page) => &page.results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            BrowseState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, BrowseState::Loading)
    }

    /// Total number of matches reported with the loaded page
    pub fn total_count(&self) -> Option<u64> {
        match &self.state {
            BrowseState::Loaded(page) => page.count,
            _ => None,
        }
    }

    /// Whether the page after the current one may hold results.
    ///
    /// Without a reported total the catalog is assumed to have more
    /// as long as the current page came back full.
    pub fn has_next_page(&self) -> bool {
        match &self.state {
            BrowseState::Loaded(page) => match page.count {
                Some(count) => self.window.has_next(count),
                None => page.results.len() >= self.window.page_size().get() as usize,
            },
            _ => false,
        }
    }
}
