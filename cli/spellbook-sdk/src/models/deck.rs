//! The deck under construction.
//!
//! A deck maps card ids to the number of copies held.
//! It never holds more than [DECK_CAPACITY] cards in total,
//! and an entry disappears as soon as its last copy is removed.

use std::num::NonZeroU32;

use indexmap::IndexMap;
use spellbook_catalog::types::{Card, CardId};
use thiserror::Error;
use tracing::debug;

/// Maximum number of cards, counting copies, a deck can hold
pub const DECK_CAPACITY: u32 = 30;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("the deck is full, it already holds {DECK_CAPACITY} cards")]
pub struct DeckFull;

/// A card held in the deck together with its number of copies.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckEntry {
    /// Snapshot of the card as it was loaded when first added
    pub card: Card,
    pub quantity: NonZeroU32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    entries: IndexMap<CardId, DeckEntry>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one copy of `card`, returning the number of copies now held.
    ///
    /// A full deck is left unchanged.
    pub fn add(&mut self, card: &Card) -> Result<u32, DeckFull> {
        if self.is_full() {
            debug!(card = %card.id, "deck full, not adding card");
            return Err(DeckFull);
        }

        let entry = self
            .entries
            .entry(card.id.clone())
            .and_modify(|entry| entry.quantity = entry.quantity.saturating_add(1))
            .or_insert_with(|| DeckEntry {
                card: card.clone(),
                quantity: NonZeroU32::MIN,
            });

        debug!(card = %card.id, quantity = entry.quantity.get(), "added card to deck");
        Ok(entry.quantity.get())
    }

    /// Remove one copy of the card, returning the number of copies left.
    ///
    /// Removing a card that is not in the deck does nothing.
    pub fn remove(&mut self, id: &CardId) -> u32 {
        let Some(entry) = self.entries.get_mut(id) else {
            return 0;
        };

        match NonZeroU32::new(entry.quantity.get() - 1) {
            Some(quantity) => {
                entry.quantity = quantity;
                debug!(card = %id, quantity = quantity.get(), "removed card copy from deck");
                quantity.get()
            },
            None => {
                self.entries.shift_remove(id);
                debug!(card = %id, "removed last card copy from deck");
                0
            },
        }
    }

    /// Total number of cards, counting copies
    pub fn total(&self) -> u32 {
        self.entries.values().map(|entry| entry.quantity.get()).sum()
    }

    pub fn is_full(&self) -> bool {
        self.total() >= DECK_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of copies of a card held, 0 if it isn't in the deck
    pub fn quantity(&self, id: &CardId) -> u32 {
        self.entries
            .get(id)
            .map(|entry| entry.quantity.get())
            .unwrap_or_default()
    }

    /// Entries in the order cards were first added
    pub fn entries(&self) -> impl Iterator<Item = &DeckEntry> {
        self.entries.values()
    }

    /// Average converted mana cost of all cards held, weighted by copies.
    ///
    /// Rounded to two decimals, 0 for an empty deck.
    pub fn average_mana_cost(&self) -> f64 {
        weighted_average(
            self.entries
                .values()
                .map(|entry| (entry.card.cmc, entry.quantity.get())),
        )
    }

    /// Average converted mana cost of the held cards that are part of `loaded`.
    ///
    /// Cards that aren't among `loaded` don't contribute at all,
    /// so the result depends on which page of the catalog is currently shown.
    pub fn average_mana_cost_within(&self, loaded: &[Card]) -> f64 {
        weighted_average(self.entries.iter().filter_map(|(id, entry)| {
            loaded
                .iter()
                .find(|card| &card.id == id)
                .map(|card| (card.cmc, entry.quantity.get()))
        }))
    }
}

fn weighted_average(costs: impl Iterator<Item = (f64, u32)>) -> f64 {
    let (total_cost, count) = costs.fold((0.0, 0_u32), |(total, count), (cmc, quantity)| {
        (total + cmc * f64::from(quantity), count + quantity)
    });

    if count == 0 {
        return 0.0;
    }

    round_to_hundredths(total_cost / f64::from(count))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    pub(crate) fn card(id: &str, cmc: f64) -> Card {
        Card {
            id: CardId::from(id),
            name: format!("Card {id}"),
            cmc,
            type_line: "Creature — Elf".to_string(),
            text: String::new(),
            image_url: None,
            mana_cost: None,
            colors: vec![],
            rarity: None,
            set_name: None,
        }
    }

    #[test]
    fn add_creates_then_increments() {
        let mut deck = Deck::new();
        let a = card("a", 2.0);

        assert_eq!(deck.add(&a), Ok(1));
        assert_eq!(deck.add(&a), Ok(2));
        assert_eq!(deck.quantity(&a.id), 2);
        assert_eq!(deck.total(), 2);
    }

    #[test]
    fn add_to_full_deck_is_noop() {
        let mut deck = Deck::new();
        let a = card("a", 1.0);
        let b = card("b", 1.0);
        for _ in 0..DECK_CAPACITY {
            deck.add(&a).unwrap();
        }
        assert!(deck.is_full());

        let before = deck.clone();
        assert_eq!(deck.add(&a), Err(DeckFull));
        assert_eq!(deck.add(&b), Err(DeckFull));
        assert_eq!(deck, before);
        assert_eq!(deck.total(), DECK_CAPACITY);
    }

    /// The cap counts copies, not distinct cards
    #[test]
    fn cap_counts_copies_across_cards() {
        let mut deck = Deck::new();
        for i in 0..15 {
            let c = card(&i.to_string(), 1.0);
            deck.add(&c).unwrap();
            deck.add(&c).unwrap();
        }
        assert!(deck.is_full());
        assert_eq!(deck.add(&card("new", 1.0)), Err(DeckFull));
    }

    #[test]
    fn remove_last_copy_removes_entry() {
        let mut deck = Deck::new();
        let a = card("a", 2.0);
        deck.add(&a).unwrap();
        deck.add(&a).unwrap();

        assert_eq!(deck.remove(&a.id), 1);
        assert_eq!(deck.remove(&a.id), 0);
        assert!(deck.is_empty());
        assert_eq!(deck.entries().count(), 0);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut deck = Deck::new();
        deck.add(&card("a", 2.0)).unwrap();
        let before = deck.clone();

        assert_eq!(deck.remove(&CardId::from("missing")), 0);
        assert_eq!(deck, before);
    }

    #[test]
    fn removing_makes_room_again() {
        let mut deck = Deck::new();
        let a = card("a", 1.0);
        for _ in 0..DECK_CAPACITY {
            deck.add(&a).unwrap();
        }
        deck.remove(&a.id);
        assert!(!deck.is_full());
        assert_eq!(deck.add(&card("b", 4.0)), Ok(1));
    }

    #[test]
    fn average_of_empty_deck_is_zero() {
        assert_eq!(Deck::new().average_mana_cost(), 0.0);
        assert_eq!(Deck::new().average_mana_cost_within(&[]), 0.0);
    }

    #[test]
    fn average_is_weighted_by_copies() {
        let mut deck = Deck::new();
        let a = card("a", 2.0);
        let b = card("b", 5.0);
        deck.add(&a).unwrap();
        deck.add(&a).unwrap();
        deck.add(&b).unwrap();

        assert_eq!(deck.average_mana_cost(), 3.0);
        assert_eq!(deck.average_mana_cost_within(&[a, b]), 3.0);
    }

    #[test]
    fn average_is_rounded_to_hundredths() {
        let mut deck = Deck::new();
        deck.add(&card("a", 1.0)).unwrap();
        deck.add(&card("b", 1.0)).unwrap();
        deck.add(&card("c", 2.0)).unwrap();

        assert_eq!(deck.average_mana_cost(), 1.33);
    }

    /// Only cards on the loaded page are looked up
    #[test]
    fn average_within_ignores_cards_not_loaded() {
        let mut deck = Deck::new();
        let a = card("a", 2.0);
        let b = card("b", 6.0);
        deck.add(&a).unwrap();
        deck.add(&b).unwrap();

        assert_eq!(deck.average_mana_cost_within(&[b.clone()]), 6.0);
        assert_eq!(deck.average_mana_cost_within(&[card("z", 9.0)]), 0.0);
        assert_eq!(deck.average_mana_cost(), 4.0);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut deck = Deck::new();
        for id in ["c", "a", "b"] {
            deck.add(&card(id, 1.0)).unwrap();
        }
        deck.remove(&CardId::from("a"));
        deck.add(&card("a", 1.0)).unwrap();

        let ids = deck
            .entries()
            .map(|entry| entry.card.id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0..6_u8).prop_map(Op::Add),
            1 => (0..6_u8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn deck_never_exceeds_capacity(ops in proptest::collection::vec(op(), 0..120)) {
            let mut deck = Deck::new();
            for op in ops {
                match op {
                    Op::Add(i) => {
                        let was_full = deck.is_full();
                        let before = deck.clone();
                        let result = deck.add(&card(&i.to_string(), f64::from(i)));
                        prop_assert_eq!(result.is_err(), was_full);
                        if was_full {
                            prop_assert_eq!(&deck, &before);
                        }
                    },
                    Op::Remove(i) => {
                        deck.remove(&CardId::from(i.to_string().as_str()));
                    },
                }
                prop_assert!(deck.total() <= DECK_CAPACITY);
                prop_assert!(deck.entries().all(|entry| entry.quantity.get() > 0));
            }
        }
    }
}
