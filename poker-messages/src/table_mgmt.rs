//! Client <--> Server messages that aren't core to a poker hand: joining/leaving a table,
//! taking a seat, starting/resetting a game, chat and the hand/action log.
use poker_core::ids::TableId;
use poker_core::Currency;
use serde::{Deserialize, Serialize};

/// Client --> Server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Msg {
    JoinTable { table_id: TableId },
    LeaveTable,
    TakeSeat { seat: u8, buy_in: Currency },
    StartGame,
    SendMessage { body: String },
    SendLog,
    GetBalance,
}

/// Server --> Client: a chat line relayed to everyone at the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub user_id: poker_core::ids::UserId,
    pub body: String,
}
