//! The `Table` value a `TableAggregate` owns: static configuration plus the single `GameState`
//! (the "Game" in the data model) it drives. Players are referenced by seat/`PlayerId` here, never
//! by pointer — a `Session` elsewhere in the server only ever stores a `TableId`.
use crate::currency::Currency;
use crate::engine::{GameState, TableType};
use crate::ids::TableId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Waiting,
    Active,
    Paused,
    Closed,
}

impl Default for TableStatus {
    fn default() -> Self {
        Self::Waiting
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyInRange {
    pub min: Currency,
    pub max: Currency,
}

impl BuyInRange {
    pub fn contains(&self, amount: Currency) -> bool {
        amount >= self.min && amount <= self.max
    }

    /// The default range the spec's configuration names: 20x/200x the big blind.
    pub fn default_for_blind(big_blind: Currency) -> Self {
        Self {
            min: big_blind * 20,
            max: big_blind * 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub small_blind: Currency,
    pub big_blind: Currency,
}

/// Table-level policy knobs that don't belong in the pure hand engine: timers and the rake
/// policy. Durations are seconds; a server-side config layer turns these into `Duration`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub action_timeout_secs: u32,
    pub hand_timeout_secs: u32,
    pub auto_start_delay_secs: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            action_timeout_secs: 30,
            hand_timeout_secs: 600,
            auto_start_delay_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub table_type: TableType,
    pub status: TableStatus,
    pub max_players: u8,
    pub blinds: Blinds,
    pub buy_in_range: BuyInRange,
    pub config: TableConfig,
    /// The hand's live state: deck, streets, pots. Reset between hands, never between tables.
    pub game: GameState,
}

impl Table {
    pub fn new(
        id: TableId,
        name: String,
        table_type: TableType,
        max_players: u8,
        blinds: Blinds,
    ) -> Self {
        Self {
            id,
            name,
            table_type,
            status: TableStatus::Waiting,
            max_players,
            buy_in_range: BuyInRange::default_for_blind(blinds.big_blind),
            blinds,
            config: TableConfig::default(),
            game: GameState::with_blinds(blinds.small_blind, blinds.big_blind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_in_range_defaults_to_20x_200x_big_blind() {
        let range = BuyInRange::default_for_blind(10.into());
        assert_eq!(range.min, 200.into());
        assert_eq!(range.max, 2000.into());
        assert!(range.contains(1000.into()));
        assert!(!range.contains(100.into()));
        assert!(!range.contains(2001.into()));
    }
}
