use super::card::{all_cards, Card, Rank, Suit};
use base64ct::{self, Base64, Encoding};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

const DECK_LEN: usize = 52;
/// TECHNICALLY this could be 22.
/// 22x2(pockets)+3(burn)+5(table) = `DECK_LEN`
pub const MAX_PLAYERS: u8 = 21;
const SEED_LEN: usize = 32;
const ENCODED_SEED_LEN: usize = 4 * ((SEED_LEN + 3 - 1) / 3); // 4 * ceil(SEED_LEN / 3)

#[derive(PartialEq, Eq, Debug, derive_more::Display, derive_more::Error)]
pub enum DeckError {
    #[display(fmt = "No more cards in deck")]
    OutOfCards,
    #[display(fmt = "Too many players to deal")]
    TooManyPlayers,
    #[display(fmt = "Need at least one player")]
    CantDealToNoPlayers,
    #[display(fmt = "{}", _0)]
    DeckSeedDecodeError(#[error(not(source))] String),
}

impl From<base64ct::Error> for DeckError {
    fn from(e: base64ct::Error) -> Self {
        Self::DeckSeedDecodeError(e.to_string())
    }
}

/// A single 52-card deck, dealt from the top (the end of the `Vec`) down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        let c: Vec<Card> = all_cards().to_vec();
        assert_eq!(c.len(), DECK_LEN);
        let mut d = Deck { cards: c };
        d.shuffle();
        d
    }
}

impl Deck {
    /// Build a fresh, seeded, shuffled deck. This is the only entry point the
    /// hand engine should use: a hand's entire dealt card sequence is a pure
    /// function of this seed, which is what lets an event-sourced hand be
    /// replayed byte-for-byte from its stored `HandStarted` event.
    pub fn new(seed: &DeckSeed) -> Self {
        let mut d = Self::default();
        d.seeded_shuffle(seed);
        d
    }

    pub fn deck_and_seed() -> (Deck, DeckSeed) {
        let ds = DeckSeed::default();
        let d = Deck::new(&ds);
        (d, ds)
    }

    /// Shuffle the deck of cards in-place with an unpredictable seed.
    pub fn shuffle(&mut self) {
        self.seeded_shuffle(&DeckSeed::default());
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = ChaChaRng::from_seed(seed.0);
        // For determinism given the same seed, the cards need to be in a
        // known order before shuffling: sort by (rank, suit) rather than
        // relying on Card's Ord, which deliberately ignores suit.
        self.cards
            .sort_unstable_by_key(|c| (c.rank, c.suit as u8));
        self.cards.shuffle(&mut rng)
    }

    /// Draw the topmost card and return it, or return an error if, e.g.,
    /// there are no more cards.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::OutOfCards)
    }

    pub fn burn(&mut self) {
        self.cards.pop();
    }

    pub fn deal_pockets(&mut self, num_players: u8) -> Result<Vec<[Card; 2]>, DeckError> {
        if num_players > MAX_PLAYERS {
            Err(DeckError::TooManyPlayers)
        } else if num_players < 1 {
            Err(DeckError::CantDealToNoPlayers)
        } else {
            let mut v = Vec::new();
            // Range only works in positive direction
            for i in (1..=num_players).rev() {
                let c1 = self.draw()?;
                let c2 = self.cards.remove(self.cards.len() - i as usize);
                v.push([c1, c2]);
            }
            Ok(v)
        }
    }
}

/// Seed for a deck's shuffle. Stored verbatim on the `HandStarted` event so a
/// hand can be replayed deterministically straight from the event log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub fn new(b: [u8; SEED_LEN]) -> Self {
        Self(b)
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut b = [0u8; SEED_LEN];
        thread_rng().fill_bytes(&mut b);
        Self(b)
    }
}

impl std::fmt::Display for DeckSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut b = [0u8; ENCODED_SEED_LEN];
        Base64::encode(&self.0, &mut b).unwrap();
        write!(f, "{}", String::from_utf8_lossy(&b))
    }
}

impl FromStr for DeckSeed {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b: [u8; SEED_LEN] = [0; SEED_LEN];
        Base64::decode(s, &mut b)?;
        Ok(DeckSeed(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::Rank;
    use std::collections::HashMap;

    const SEED1: DeckSeed = DeckSeed([1; SEED_LEN]);
    const SEED2: DeckSeed = DeckSeed([0; SEED_LEN]);

    #[test]
    fn right_len_1() {
        let d = Deck::default();
        assert_eq!(d.cards.len(), DECK_LEN);
    }

    #[test]
    fn right_count_1() {
        let d = Deck::default();
        let mut counts: HashMap<Card, u16> = HashMap::new();
        for card in d.cards.iter() {
            *counts.entry(*card).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), DECK_LEN);
        for count in counts.values() {
            assert_eq!(*count, 1);
        }
    }

    #[test]
    fn draw_1() {
        let mut d = Deck::default();
        for _ in 0..DECK_LEN {
            assert!(d.draw().is_ok());
        }
        assert_eq!(d.draw().unwrap_err(), DeckError::OutOfCards);
    }

    #[test]
    fn is_shuffled() {
        let mut d = Deck::default();
        let top = d.draw().unwrap();
        let next = d.draw().unwrap();
        let third = d.draw().unwrap();
        let fourth = d.draw().unwrap();
        if top.rank == Rank::Ace
            && next.rank == Rank::Ace
            && third.rank == Rank::Ace
            && fourth.rank == Rank::Ace
        {
            panic!("Top four cards were all aces! This indicates the deck was not shuffled. There is a *very* small chance this is a false positive.")
        }
    }

    #[test]
    fn deal_pockets_10() {
        let mut d = Deck::default();
        let expect0 = [d.cards[51], d.cards[41]];
        let expect9 = [d.cards[42], d.cards[32]];
        let actual = d.deal_pockets(10).unwrap();
        assert_eq!(actual[0], expect0);
        assert_eq!(actual[9], expect9);
    }

    #[test]
    fn deal_pockets_max() {
        let mut d = Deck::default();
        let n = MAX_PLAYERS as usize;
        let expect0 = [d.cards[51], d.cards[51 - n]];
        let expectn = [d.cards[51 - (n - 1)], d.cards[51 - n - (n - 1)]];
        let actual = d.deal_pockets(n as u8).unwrap();
        assert_eq!(actual[0], expect0);
        assert_eq!(actual[actual.len() - 1], expectn);
    }

    #[test]
    fn deal_pockets() {
        let mut d = Deck::default();
        let v = d.deal_pockets(10).expect("Can't deal pockets?");
        assert_eq!(d.cards.len(), DECK_LEN - 20);
        assert_eq!(v.len(), 10);
    }

    /// Given a specific seed, the order of the cards is always the same: this
    /// is what lets a hand be replayed from its stored seed.
    #[test]
    fn deck_is_seedable() {
        let mut d = Deck::new(&SEED1);
        let c1 = d.draw().unwrap();
        let c2 = d.draw().unwrap();
        assert_eq!(c1, Card::from(['3', 'h']));
        assert_eq!(c2, Card::from(['J', 's']));
        let mut d2 = Deck::new(&SEED2);
        d2.burn();
        d2.burn();
        assert_ne!(d, d2);
    }

    #[test]
    fn seed_to_from_string() {
        let d = DeckSeed::default();
        let s = d.to_string();
        let d2: DeckSeed = s.parse().unwrap();
        assert_eq!(d, d2);
    }
}
