//! Client --> Server: the wire verbs that drive a single hand. These map 1:1 onto
//! `poker_core::aggregate::TableAggregate::player_action`'s `BetKind`, minus `AllIn` — a client
//! never asks explicitly for all-in, it just bets/calls/raises more than its stack and the engine
//! coerces the action, same as the teacher's `Player::bet`.
use poker_core::Currency;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Msg {
    PlayerFold,
    PlayerCall,
    PlayerCheck,
    PlayerRaise { amount: Currency },
}
