use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Result, bail};
use bpaf::Bpaf;
use spellbook_catalog::Client;
use spellbook_catalog::types::{Color, FilterCriteria, PageSize};
use spellbook_sdk::models::browser::{BrowseState, CatalogBrowser};
use spellbook_sdk::models::deck::Deck;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::utils::dialog::{Dialog, Spinner};
use crate::utils::display::{CardTile, page_footer};
use crate::utils::message;

/// Show the spinner only for fetches slower than this
const SPINNER_DELAY: Duration = Duration::from_millis(500);

/// Criteria to narrow a search by
#[derive(Debug, Bpaf, Clone, Default)]
pub struct FilterArgs {
    /// Only show cards whose name contains <NAME>
    #[bpaf(long, argument("NAME"))]
    pub name: Option<String>,

    /// Only show cards of <COLOR> (Red, White, Blue or Black)
    ///
    /// Repeat to select several colors.
    #[bpaf(long("color"), argument("COLOR"))]
    pub colors: Vec<Color>,

    /// Only show cards of <TYPE>, repeat to select several types
    #[bpaf(long("type"), argument("TYPE"))]
    pub types: Vec<String>,

    /// Only show cards of <SUBTYPE>, repeat to select several subtypes
    #[bpaf(long("subtype"), argument("SUBTYPE"))]
    pub subtypes: Vec<String>,

    /// Only show cards whose rules text contains <TEXT>
    #[bpaf(long, argument("TEXT"))]
    pub text: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            name: args.name.unwrap_or_default(),
            colors: args.colors.into_iter().collect(),
            types: args.types.into_iter().collect(),
            subtypes: args.subtypes.into_iter().collect(),
            text: args.text.unwrap_or_default(),
        }
    }
}

// Search the catalog for cards
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display the page of results as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Page of results to show (default: 1)
    #[bpaf(long, argument("PAGE"))]
    pub page: Option<NonZeroU32>,

    /// Number of cards per page, one of 10, 20, 50 or 100
    #[bpaf(long("page-size"), argument("SIZE"))]
    pub page_size: Option<PageSize>,

    #[bpaf(external(filter_args))]
    pub filters: FilterArgs,
}

impl Search {
    #[instrument(name = "search", fields(json = self.json), skip_all)]
    pub async fn handle(self, config: Config, client: Client) -> Result<()> {
        let mut browser = CatalogBrowser::new(self.page_size.unwrap_or(config.page_size));
        browser.submit_criteria(self.filters.into());
        if let Some(page) = self.page {
            browser.set_page(page);
        }
        debug!(query = ?browser.query(), "searching catalog");

        fetch_cards(&mut browser, &client);

        let page = match browser.state() {
            BrowseState::Loaded(page) => page,
            BrowseState::Failed(message) => bail!("{message}"),
            state => bail!("search did not complete: {state:?}"),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(page)?);
            return Ok(());
        }

        if page.results.is_empty() {
            message::plain("No cards match the search.");
            return Ok(());
        }

        let deck = Deck::new();
        for card in &page.results {
            println!("{}\n", CardTile::new(card, &deck));
        }
        println!("{}", grid_footer(&browser));
        Ok(())
    }
}

/// Fetch the browser's current page, showing a spinner while loading
pub(crate) fn fetch_cards(browser: &mut CatalogBrowser, client: &Client) {
    tokio::task::block_in_place(|| {
        Dialog {
            message: "Loading cards...",
            help_message: None,
            typed: Spinner::new(|| {
                tokio::runtime::Handle::current().block_on(browser.refresh(client))
            }),
        }
        .spin_with_delay(SPINNER_DELAY)
    });
}

pub(crate) fn grid_footer(browser: &CatalogBrowser) -> String {
    let window = browser.window();
    let count = browser.total_count();
    page_footer(
        window.page().get(),
        count.map(|count| window.last_page(count).get()),
        count,
    )
}
