pub mod card;
pub mod deck;
pub mod evaluator;

pub use card::{all_cards, Card, Rank, Suit};
pub use deck::{Deck, DeckError, DeckSeed};
pub use evaluator::{best_hands, best_of_cards, Hand, HandClass, HandError, WinState};
