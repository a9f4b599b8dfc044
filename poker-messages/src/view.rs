//! Server --> Client payloads: the authoritative table view, session info, and balance updates.
//! Field shapes follow spec.md §6's `update-game`/`update-balance` literally.
use chrono::{DateTime, Utc};
use poker_core::cards::Card;
use poker_core::engine::{State, TableType};
use poker_core::ids::{SessionId, TableId, UserId};
use poker_core::{Currency, PlayerId, PotId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotView {
    pub id: PotId,
    pub amount: Currency,
    pub eligible_players: Vec<PlayerId>,
}

/// One seat as shown to a particular viewer. `hole_cards` is `None` for every seat but the
/// viewer's own, mirroring `poker_core::engine::GameState::filtered_changes_since`'s
/// hole-card redaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: u8,
    pub player_id: PlayerId,
    pub chips: Currency,
    pub current_bet: Currency,
    pub hole_cards: Option<[Card; 2]>,
    pub folded: bool,
    pub all_in: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub table_id: TableId,
    pub table_type: TableType,
    pub state: State,
    pub community_cards: Vec<Card>,
    pub pots: Vec<PotView>,
    pub seats: Vec<SeatView>,
    pub action_seat: Option<u8>,
}

/// `update-game.session_info` shape from spec.md §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: UserId,
    pub session_id: Option<SessionId>,
    pub seat_number: Option<u8>,
    pub is_seated: bool,
    pub has_session: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    BuyIn,
    Win,
    CashOut,
    TransferIn,
    TransferOut,
    BalanceCheck,
}

/// `update-balance` fields from spec.md §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub main_balance: Currency,
    pub game_balance: Currency,
    pub currency: String,
    pub transaction_id: Option<String>,
    pub change_amount: Currency,
    pub change_type: ChangeType,
    pub timestamp: DateTime<Utc>,
}
