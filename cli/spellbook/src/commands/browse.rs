use std::fmt::{self, Display};
use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use bpaf::Bpaf;
use inquire::InquireError;
use inquire::error::InquireResult;
use itertools::Itertools;
use spellbook_catalog::Client;
use spellbook_catalog::types::{CardId, PageSize};
use spellbook_sdk::models::combobox::Combobox;
use spellbook_sdk::models::deck::DECK_CAPACITY;
use spellbook_sdk::models::filter::FilterForm;
use spellbook_sdk::session::{AddCardError, Session};
use tracing::{debug, instrument};

use super::search::{fetch_cards, grid_footer};
use crate::config::Config;
use crate::utils::dialog::{Dialog, Input, Select, Spinner, Text};
use crate::utils::display::{CardTile, DeckSummary, NAME_LIMIT, action_label, truncate};
use crate::utils::message;

const SPINNER_DELAY: Duration = Duration::from_millis(500);

// Page through the catalog and build a deck interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {
    /// Number of cards per page, one of 10, 20, 50 or 100
    #[bpaf(long("page-size"), argument("SIZE"))]
    pub page_size: Option<PageSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
enum BrowseAction {
    #[display("Next page")]
    NextPage,
    #[display("Previous page")]
    PreviousPage,
    #[display("Go to page...")]
    GoToPage,
    #[display("Change page size")]
    ChangePageSize,
    #[display("Edit filters")]
    EditFilters,
    #[display("Add a card to the deck")]
    AddCard,
    #[display("View deck")]
    ViewDeck,
    #[display("Show cards again")]
    ShowCards,
    #[display("Quit")]
    Quit,
}

/// The actions that make sense in the current state of the session
fn available_actions(session: &Session) -> Vec<BrowseAction> {
    let browser = &session.browser;
    let has_cards = !browser.cards().is_empty();

    let mut actions = Vec::new();
    if browser.has_next_page() {
        actions.push(BrowseAction::NextPage);
    }
    if browser.window().page() > NonZeroU32::MIN {
        actions.push(BrowseAction::PreviousPage);
    }
    actions.extend([
        BrowseAction::GoToPage,
        BrowseAction::ChangePageSize,
        BrowseAction::EditFilters,
    ]);
    // adding is disabled once the deck is full
    if has_cards && !session.deck.is_full() {
        actions.push(BrowseAction::AddCard);
    }
    if !session.deck.is_empty() {
        actions.push(BrowseAction::ViewDeck);
    }
    if has_cards {
        actions.push(BrowseAction::ShowCards);
    }
    actions.push(BrowseAction::Quit);
    actions
}

/// Map an aborted prompt to [None]
///
/// Ctrl-C is passed on as an error, see [is_interrupt].
fn unless_cancelled<T>(result: InquireResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Whether `err` stems from Ctrl-C in any prompt, which ends the session
fn is_interrupt(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationInterrupted)
    )
}

impl Browse {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, config: Config, client: Client) -> Result<()> {
        if !Dialog::<()>::can_prompt() {
            bail!("'spellbook browse' needs an interactive terminal, use 'spellbook search' instead");
        }

        let mut session = Session::new(self.page_size.unwrap_or(config.page_size));

        tokio::task::block_in_place(|| {
            Dialog {
                message: "Loading filter options...",
                help_message: None,
                typed: Spinner::new(|| {
                    tokio::runtime::Handle::current()
                        .block_on(session.load_filter_options(&client))
                }),
            }
            .spin_with_delay(SPINNER_DELAY)
        });

        fetch_and_show(&mut session, &client);

        loop {
            let status = format!(
                "Deck: {}/{DECK_CAPACITY} cards, average mana cost {:.2}",
                session.deck.total(),
                session.average_mana_cost()
            );
            let action = Dialog {
                message: "What next?",
                help_message: Some(&status),
                typed: Select {
                    options: available_actions(&session),
                },
            }
            .prompt();

            let action = match action {
                Ok(action) => action,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    break;
                },
                Err(err) => return Err(err.into()),
            };
            debug!(%action, "browse action");

            match perform(&mut session, &client, action) {
                Ok(ControlFlow::Continue(())) => {},
                Ok(ControlFlow::Break(())) => break,
                Err(err) if is_interrupt(&err) => break,
                Err(err) => return Err(err),
            }
        }

        if !session.deck.is_empty() {
            message::plain(DeckSummary(&session.deck));
        }
        Ok(())
    }
}

fn perform(session: &mut Session, client: &Client, action: BrowseAction) -> Result<ControlFlow<()>> {
    match action {
        BrowseAction::NextPage => {
            session.browser.next_page();
            fetch_and_show(session, client);
        },
        BrowseAction::PreviousPage => {
            session.browser.previous_page();
            fetch_and_show(session, client);
        },
        BrowseAction::GoToPage => {
            let page = Dialog {
                message: "Go to page",
                help_message: None,
                typed: Input {
                    default: Some(session.browser.window().page()),
                },
            }
            .prompt();
            if let Some(page) = unless_cancelled(page)? {
                session.browser.set_page(page);
                fetch_and_show(session, client);
            }
        },
        BrowseAction::ChangePageSize => {
            let page_size = Dialog {
                message: "Cards per page",
                help_message: Some("The current page number is kept"),
                typed: Select {
                    options: PageSize::ALL.to_vec(),
                },
            }
            .prompt();
            if let Some(page_size) = unless_cancelled(page_size)? {
                session.browser.set_page_size(page_size);
                fetch_and_show(session, client);
            }
        },
        BrowseAction::EditFilters => {
            if let Some(form) = edit_filters(session.filter_form())? {
                session.submit_filters(form);
                fetch_and_show(session, client);
            }
        },
        BrowseAction::AddCard => add_card(session)?,
        BrowseAction::ViewDeck => view_deck(session)?,
        BrowseAction::ShowCards => show_cards(session),
        BrowseAction::Quit => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}

fn fetch_and_show(session: &mut Session, client: &Client) {
    fetch_cards(&mut session.browser, client);
    show_cards(session);
}

fn show_cards(session: &Session) {
    let browser = &session.browser;
    if let Some(error) = browser.error() {
        message::error(error);
        return;
    }

    if browser.cards().is_empty() {
        message::plain("No cards match the search.");
        return;
    }

    for card in browser.cards() {
        println!("{}\n", CardTile::new(card, &session.deck));
    }
    println!("{}", grid_footer(browser));
}

/// An entry of a card picker
struct CardChoice {
    id: CardId,
    label: String,
}

impl Display for CardChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

fn add_card(session: &mut Session) -> Result<()> {
    let options = session
        .browser
        .cards()
        .iter()
        .map(|card| CardChoice {
            id: card.id.clone(),
            label: format!(
                "{}  ({})  {}",
                truncate(&card.name, NAME_LIMIT),
                card.cmc,
                action_label("Add", session.deck.quantity(&card.id))
            ),
        })
        .collect::<Vec<_>>();

    let choice = Dialog {
        message: "Add which card?",
        help_message: None,
        typed: Select { options },
    }
    .prompt();
    let Some(choice) = unless_cancelled(choice)? else {
        return Ok(());
    };

    match session.add_to_deck(&choice.id) {
        Ok(quantity) => message::updated(format!(
            "Added card to the deck, now holding {quantity} (deck: {}/{DECK_CAPACITY})",
            session.deck.total()
        )),
        Err(AddCardError::DeckFull(err)) => message::warning(err),
        Err(err @ AddCardError::NotLoaded(_)) => message::warning(err),
    }
    Ok(())
}

#[derive(derive_more::Display)]
enum DeckAction {
    #[display("{_0}")]
    Remove(CardChoice),
    #[display("Back")]
    Back,
}

fn view_deck(session: &mut Session) -> Result<()> {
    loop {
        message::plain(DeckSummary(&session.deck));
        if session.deck.is_empty() {
            return Ok(());
        }

        let options = session
            .deck
            .entries()
            .map(|entry| {
                DeckAction::Remove(CardChoice {
                    id: entry.card.id.clone(),
                    label: action_label(
                        &format!("Remove {}", truncate(&entry.card.name, NAME_LIMIT)),
                        entry.quantity.get(),
                    ),
                })
            })
            .chain([DeckAction::Back])
            .collect::<Vec<_>>();

        let action = Dialog {
            message: "Remove a card?",
            help_message: None,
            typed: Select { options },
        }
        .prompt();

        match unless_cancelled(action)? {
            Some(DeckAction::Remove(choice)) => {
                let remaining = session.remove_from_deck(&choice.id);
                message::deleted(format!("Removed a copy, {remaining} left"));
            },
            Some(DeckAction::Back) | None => return Ok(()),
        }
    }
}

#[derive(Debug, derive_more::Display)]
enum FormAction {
    #[display("Name: {_0}")]
    Name(String),
    #[display("Colors: {_0}")]
    Colors(String),
    #[display("Types: {_0}")]
    Types(String),
    #[display("Subtypes: {_0}")]
    Subtypes(String),
    #[display("Text: {_0}")]
    Text(String),
    #[display("Apply filters")]
    Apply,
    #[display("Cancel")]
    Cancel,
}

fn describe_text(text: &str) -> String {
    if text.is_empty() {
        "any".to_string()
    } else {
        format!("'{text}'")
    }
}

fn describe_selection(combobox: &Combobox) -> String {
    if combobox.selected().is_empty() {
        "any".to_string()
    } else {
        combobox.selected().iter().join(", ")
    }
}

/// Let the user edit a draft of the filters.
///
/// Returns [None] if the draft is cancelled.
fn edit_filters(mut form: FilterForm) -> Result<Option<FilterForm>> {
    loop {
        let options = vec![
            FormAction::Name(describe_text(&form.name)),
            FormAction::Colors(describe_selection(&form.colors)),
            FormAction::Types(describe_selection(&form.types)),
            FormAction::Subtypes(describe_selection(&form.subtypes)),
            FormAction::Text(describe_text(&form.text)),
            FormAction::Apply,
            FormAction::Cancel,
        ];

        let action = Dialog {
            message: "Filter cards",
            help_message: Some("Apply to search from the first page"),
            typed: Select { options },
        }
        .prompt();

        match unless_cancelled(action)? {
            Some(FormAction::Name(_)) => edit_text("Card name contains", &mut form.name)?,
            Some(FormAction::Colors(_)) => edit_combobox("colors", &mut form.colors)?,
            Some(FormAction::Types(_)) => edit_combobox("types", &mut form.types)?,
            Some(FormAction::Subtypes(_)) => edit_combobox("subtypes", &mut form.subtypes)?,
            Some(FormAction::Text(_)) => edit_text("Rules text contains", &mut form.text)?,
            Some(FormAction::Apply) => return Ok(Some(form)),
            Some(FormAction::Cancel) | None => return Ok(None),
        }
    }
}

fn edit_text(message: &str, value: &mut String) -> Result<()> {
    let text = Dialog {
        message,
        help_message: None,
        typed: Text {
            initial: value.clone(),
        },
    }
    .prompt();
    if let Some(text) = unless_cancelled(text)? {
        *value = text;
    }
    Ok(())
}

#[derive(Debug, derive_more::Display)]
enum ComboAction {
    #[display("Add {_0}")]
    Add(String),
    #[display("Remove {_0}")]
    Remove(String),
    #[display("Done")]
    Done,
}

/// Heading of the combobox editor, naming the pending search while the list is open
fn combobox_heading(label: &str, combobox: &Combobox) -> String {
    let heading = format!("Selected {label}: {}", describe_selection(combobox));
    if combobox.is_open() && !combobox.filter().is_empty() {
        format!("{heading} (searching '{}')", combobox.filter())
    } else {
        heading
    }
}

fn edit_combobox(label: &str, combobox: &mut Combobox) -> Result<()> {
    loop {
        combobox.tick(Instant::now());

        let mut options = Vec::new();
        if combobox.options().iter().any(|option| !combobox.is_selected(option)) {
            options.push(ComboAction::Add(label.to_string()));
        }
        options.extend(combobox.selected().iter().cloned().map(ComboAction::Remove));
        options.push(ComboAction::Done);

        let action = Dialog {
            message: &combobox_heading(label, combobox),
            help_message: None,
            typed: Select { options },
        }
        .prompt();

        match unless_cancelled(action)? {
            Some(ComboAction::Add(_)) => pick_option(label, combobox)?,
            Some(ComboAction::Remove(selected)) => {
                combobox.remove(&selected);
            },
            Some(ComboAction::Done) | None => return Ok(()),
        }
    }
}

/// Narrow the options down by a filter text and select one of them
fn pick_option(label: &str, combobox: &mut Combobox) -> Result<()> {
    combobox.focus();

    let filter = Dialog {
        message: &format!("Search {label}"),
        help_message: Some("Leave empty to list all"),
        typed: Text {
            initial: combobox.filter().to_string(),
        },
    }
    .prompt();
    let Some(filter) = unless_cancelled(filter)? else {
        combobox.blur(Instant::now());
        return Ok(());
    };
    combobox.set_filter(filter.trim());

    let visible = combobox
        .visible_options()
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if visible.is_empty() {
        message::warning(format!("No {label} match '{}'", combobox.filter()));
        combobox.blur(Instant::now());
        return Ok(());
    }

    let choice = Dialog {
        message: &format!("Add which of the {label}?"),
        help_message: None,
        typed: Select { options: visible },
    }
    .prompt();
    match unless_cancelled(choice)? {
        Some(choice) => {
            combobox.select(&choice);
        },
        None => combobox.blur(Instant::now()),
    }
    Ok(())
}
