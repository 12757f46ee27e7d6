//! A single browsing session.
//!
//! [Session] is the one owner of everything a front end shows:
//! the card grid, the filter options and the deck being built.
//! Front ends hold a session and pass a catalog client to the
//! operations that need one.

use spellbook_catalog::ClientTrait;
use spellbook_catalog::types::{CardId, PageSize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::browser::CatalogBrowser;
use crate::models::deck::{Deck, DeckFull};
use crate::models::filter::FilterForm;

#[derive(Debug, Error, PartialEq)]
pub enum AddCardError {
    #[error("card '{0}' is not on the current page")]
    NotLoaded(CardId),
    #[error(transparent)]
    DeckFull(#[from] DeckFull),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub browser: CatalogBrowser,
    pub deck: Deck,
    type_options: Vec<String>,
    subtype_options: Vec<String>,
}

impl Session {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            browser: CatalogBrowser::new(page_size),
            ..Default::default()
        }
    }

    pub fn type_options(&self) -> &[String] {
        &self.type_options
    }

    pub fn subtype_options(&self) -> &[String] {
        &self.subtype_options
    }

    /// Load the type and subtype lists offered by the filter form.
    ///
    /// Either list stays empty if fetching it fails,
    /// filtering by that field is then just not possible.
    #[instrument(skip_all)]
    pub async fn load_filter_options(&mut self, client: &impl ClientTrait) {
        self.type_options = match client.card_types().await {
            Ok(types) => types,
            Err(err) => {
                warn!(error = %err, "failed to load card types");
                Vec::new()
            },
        };

        self.subtype_options = match client.card_subtypes().await {
            Ok(subtypes) => subtypes,
            Err(err) => {
                warn!(error = %err, "failed to load card subtypes");
                Vec::new()
            },
        };

        debug!(
            types = self.type_options.len(),
            subtypes = self.subtype_options.len(),
            "loaded filter options"
        );
    }

    /// A draft of the current criteria
    pub fn filter_form(&self) -> FilterForm {
        FilterForm::new(
            self.browser.criteria(),
            &self.type_options,
            &self.subtype_options,
        )
    }

    /// Commit a draft, restarting the search from its first page
    pub fn submit_filters(&mut self, form: FilterForm) {
        self.browser.submit_criteria(form.submit());
    }

    /// Add a copy of a card shown on the current page to the deck.
    pub fn add_to_deck(&mut self, id: &CardId) -> Result<u32, AddCardError> {
        let card = self
            .browser
            .cards()
            .iter()
            .find(|card| &card.id == id)
            .ok_or_else(|| AddCardError::NotLoaded(id.clone()))?;
        Ok(self.deck.add(card)?)
    }

    pub fn remove_from_deck(&mut self, id: &CardId) -> u32 {
        self.deck.remove(id)
    }

    /// Average mana cost of every card in the deck
    pub fn average_mana_cost(&self) -> f64 {
        self.deck.average_mana_cost()
    }
}
