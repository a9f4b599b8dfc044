pub mod aggregate;
mod bet;
pub mod cards;
pub mod currency;
pub mod engine;
pub mod events;
pub mod ids;
mod log;
pub mod player;
pub mod pot;
pub mod table;

pub use bet::{BetAction, BetError, BetStatus};
pub use cards::{Deck, DeckError, DeckSeed};
pub use currency::Currency;
pub use log::LogItem;
pub use pot::PotId;

/// Maximum number of seats at any one table. Also the fixed size of the `Players` array.
pub const MAX_PLAYERS: usize = 12;
/// Identity of a player within a single running hand. Distinct from `ids::UserId`: a `UserId`
/// persists across sessions and tables, a `PlayerId` only identifies a seat for the lifetime of
/// the `Players` struct that assigned it.
pub type PlayerId = i32;
pub type SeqNum = usize;
pub type SeatIdx = usize;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GameError {
    PlayerAlreadySeated,
    TableFull,
    NotEnoughPlayers,
    StreetNotComplete,
    PlayerNotFound,
    PlayerIsNotBetting,
    NoBetExpected,
    NotYourTurn,
    PlayerStackTooShort,
    InvalidBet,
    InvalidAction,
    InvalidSeat,
    InvalidBuyIn,
    GameNotRunning,
    DeckError(cards::DeckError),
    HandError(cards::HandError),
    BetError(bet::BetError),
}

impl From<cards::DeckError> for GameError {
    fn from(e: cards::DeckError) -> Self {
        Self::DeckError(e)
    }
}

impl From<cards::HandError> for GameError {
    fn from(e: cards::HandError) -> Self {
        Self::HandError(e)
    }
}

impl From<bet::BetError> for GameError {
    fn from(e: bet::BetError) -> Self {
        Self::BetError(e)
    }
}
