//! Terminal rendering of cards and decks.

use std::borrow::Cow;
use std::fmt::{self, Display};

use crossterm::style::Stylize;
use itertools::Itertools;
use spellbook_catalog::types::Card;
use spellbook_sdk::models::deck::{DECK_CAPACITY, Deck};

/// Longest card name shown in full on a tile
pub const NAME_LIMIT: usize = 22;
/// Longest rules text shown in full on a tile
pub const TEXT_LIMIT: usize = 210;
const ELLIPSIS: &str = "...";
const DEFAULT_WIDTH: usize = 60;

/// Cut `text` after `limit` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Label of the add or remove action of a card, counting the copies held
pub fn action_label(action: &str, quantity: u32) -> String {
    if quantity == 0 {
        action.to_string()
    } else {
        format!("{action} (×{quantity})")
    }
}

/// A card of the result grid.
pub struct CardTile<'a> {
    pub card: &'a Card,
    /// Copies of the card in the deck
    pub quantity: u32,
    pub deck_full: bool,
    pub width: usize,
}

impl<'a> CardTile<'a> {
    pub fn new(card: &'a Card, deck: &Deck) -> Self {
        Self {
            card,
            quantity: deck.quantity(&card.id),
            deck_full: deck.is_full(),
            width: textwrap::termwidth().min(DEFAULT_WIDTH),
        }
    }
}

impl Display for CardTile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let card = self.card;
        let name = truncate(&card.name, NAME_LIMIT);
        writeln!(f, "{}  ({})", (&*name).bold(), card.cmc)?;

        if let Some(mana_cost) = &card.mana_cost {
            writeln!(f, "  Cost: {mana_cost}")?;
        }
        writeln!(f, "  {}", card.type_line)?;
        if !card.colors.is_empty() {
            writeln!(f, "  Colors: {}", card.colors.iter().join(", "))?;
        }
        if let Some(image_url) = &card.image_url {
            writeln!(f, "  Image: {image_url}")?;
        }

        if !card.text.is_empty() {
            let text = truncate(&card.text, TEXT_LIMIT);
            let options = textwrap::Options::new(self.width)
                .initial_indent("  ")
                .subsequent_indent("  ");
            writeln!(f, "{}", textwrap::fill(&text, options))?;
        }

        let action = action_label("Add", self.quantity);
        if self.deck_full {
            write!(f, "  [{action}] [deck full]")
        } else {
            write!(f, "  [{action}]")
        }
    }
}

/// Summary of the deck: entries with quantities, total and average cost.
pub struct DeckSummary<'a>(pub &'a Deck);

impl Display for DeckSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deck = self.0;
        writeln!(f, "Deck: {}/{DECK_CAPACITY} cards", deck.total())?;
        for entry in deck.entries() {
            writeln!(
                f,
                "  {:>2} × {}  ({})",
                entry.quantity,
                entry.card.name,
                entry.card.cmc
            )?;
        }
        write!(f, "Average mana cost: {:.2}", deck.average_mana_cost())
    }
}

/// Footer under the result grid
pub fn page_footer(page: u32, last_page: Option<u32>, count: Option<u64>) -> String {
    match (last_page, count) {
        (Some(last_page), Some(count)) => {
            format!("Page {page} of {last_page} ({count} cards)")
        },
        _ => format!("Page {page}"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use spellbook_catalog::types::CardId;

    use super::*;

    fn card(name: &str, text: &str) -> Card {
        Card {
            id: CardId::from(name),
            name: name.to_string(),
            cmc: 3.0,
            type_line: "Creature — Goblin".to_string(),
            text: text.to_string(),
            image_url: None,
            mana_cost: Some("{2}{R}".to_string()),
            colors: vec!["Red".to_string()],
            rarity: None,
            set_name: None,
        }
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("Goblin Guide", NAME_LIMIT), "Goblin Guide");
        let exact = "x".repeat(NAME_LIMIT);
        assert_eq!(truncate(&exact, NAME_LIMIT), exact);
    }

    #[test]
    fn truncate_cuts_long_text() {
        let long = "Akroma, Angel of Wrath and Fury";
        assert_eq!(truncate(long, NAME_LIMIT), "Akroma, Angel of Wrath...");

        let text = "a".repeat(TEXT_LIMIT + 5);
        let truncated = truncate(&text, TEXT_LIMIT);
        assert_eq!(truncated.len(), TEXT_LIMIT + ELLIPSIS.len());
        assert!(truncated.ends_with(ELLIPSIS));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Æther Vial", 3), "Æth...");
    }

    #[test]
    fn action_label_counts_copies() {
        assert_eq!(action_label("Add", 0), "Add");
        assert_eq!(action_label("Add", 3), "Add (×3)");
        assert_eq!(action_label("Remove", 1), "Remove (×1)");
    }

    #[test]
    fn tile_shows_card_and_action() {
        let card = card("Goblin Guide", "Haste");
        let tile = CardTile {
            card: &card,
            quantity: 2,
            deck_full: false,
            width: 40,
        }
        .to_string();

        assert!(tile.contains("Goblin Guide"), "{tile}");
        assert!(tile.contains("Creature — Goblin"), "{tile}");
        assert!(tile.contains("  Haste"), "{tile}");
        assert!(tile.ends_with("[Add (×2)]"), "{tile}");
    }

    #[test]
    fn tile_links_image_if_present() {
        let mut card = card("Goblin Guide", "Haste");
        let tile = CardTile {
            card: &card,
            quantity: 0,
            deck_full: false,
            width: 40,
        }
        .to_string();
        assert!(!tile.contains("Image:"), "{tile}");

        card.image_url = Some("http://example.com/guide.jpg".to_string());
        let tile = CardTile {
            card: &card,
            quantity: 0,
            deck_full: false,
            width: 40,
        }
        .to_string();
        assert!(tile.contains("  Image: http://example.com/guide.jpg\n"), "{tile}");
    }

    #[test]
    fn tile_marks_full_deck() {
        let card = card("Goblin Guide", "");
        let tile = CardTile {
            card: &card,
            quantity: 0,
            deck_full: true,
            width: 40,
        }
        .to_string();

        assert!(tile.ends_with("[Add] [deck full]"), "{tile}");
    }

    #[test]
    fn deck_summary_lists_entries() {
        let mut deck = Deck::new();
        let guide = card("Goblin Guide", "");
        deck.add(&guide).unwrap();
        deck.add(&guide).unwrap();

        let summary = DeckSummary(&deck).to_string();
        assert!(summary.starts_with("Deck: 2/30 cards"), "{summary}");
        assert!(summary.contains(" 2 × Goblin Guide"), "{summary}");
        assert!(summary.ends_with("Average mana cost: 3.00"), "{summary}");
    }

    #[test]
    fn footer_with_and_without_count() {
        assert_eq!(page_footer(2, Some(5), Some(93)), "Page 2 of 5 (93 cards)");
        assert_eq!(page_footer(2, None, None), "Page 2");
    }
}
