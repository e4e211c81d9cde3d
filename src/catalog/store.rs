//! In-memory card catalog with name and pack lookup.

use tracing::debug;

use crate::catalog::card::Card;

/// Read-only card dataset, in the order the source served it.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl CardCatalog {
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Find cards by name.
    ///
    /// An exact (case-insensitive) full-name match returns just that card.
    /// Otherwise every card whose name contains `name` is returned.
    pub fn find_by_name(&self, name: &str) -> Vec<&Card> {
        debug!("Looking for card {:?}", name);
        self.search(name, |_| true)
    }

    /// Find cards by name within one pack.
    ///
    /// Same rules as [`CardCatalog::find_by_name`], restricted to cards whose
    /// pack code equals `pack_code` (case-insensitive).
    pub fn find_by_name_and_pack(&self, name: &str, pack_code: &str) -> Vec<&Card> {
        debug!("Looking for card {:?} in pack {:?}", name, pack_code);
        self.search(name, |card| card.pack_code.eq_ignore_ascii_case(pack_code))
    }

    /// All cards of a pack, in catalog order.
    pub fn find_by_pack(&self, pack_code: &str) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| card.pack_code.eq_ignore_ascii_case(pack_code))
            .collect()
    }

    /// Display name of a pack, taken from its first card.
    pub fn pack_name(&self, pack_code: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|card| card.pack_code.eq_ignore_ascii_case(pack_code))
            .map(|card| card.pack_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn search<F>(&self, name: &str, in_scope: F) -> Vec<&Card>
    where
        F: Fn(&Card) -> bool,
    {
        let needle = name.to_lowercase();
        let mut matches = Vec::new();

        for card in self.cards.iter().filter(|card| in_scope(card)) {
            let card_name = card.name.to_lowercase();
            if card_name == needle {
                return vec![card];
            }
            if card_name.contains(&needle) {
                matches.push(card);
            }
        }

        matches
    }
}
