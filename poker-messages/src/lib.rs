//! The WebSocket wire protocol between a client and the Hub. Each concern gets its own small
//! `Msg` enum (`action`, `table_mgmt`) rather than one flat enum, the same split the teacher
//! used; `ClientMsg`/`ServerMsg` are the envelopes the Hub actually reads off and writes to the
//! socket.
pub mod action;
pub mod table_mgmt;
pub mod view;

use poker_core::ids::UserId;
use poker_core::PlayerId;
use serde::{Deserialize, Serialize};

/// Every message a client can send. `#[serde(untagged)]` lets each inner `Msg` keep its own
/// internal `action` tag (spec.md §6: `{action: <verb>, ...fields}`) while still letting the Hub
/// deserialize one incoming frame without knowing in advance which concern it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientMsg {
    Action(action::Msg),
    TableMgmt(table_mgmt::Msg),
}

/// Every message the Hub can send back down a socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ServerMsg {
    NewMessage(table_mgmt::NewMessage),
    NewLog { entries: Vec<String> },
    UpdateGame {
        view: view::GameView,
        session_info: Option<view::SessionInfo>,
    },
    UpdatePlayerUuid {
        player_id: PlayerId,
        user_id: UserId,
    },
    UpdateBalance(view::BalanceUpdate),
    Error { message: String },
    Warning { message: String },
    Success { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_raise_round_trips_with_kebab_case_tag() {
        let msg = ClientMsg::Action(action::Msg::PlayerRaise {
            amount: 20.into(),
        });
        let s = serde_json::to_string(&msg).unwrap();
        assert!(s.contains("\"player-raise\""));
        let back: ClientMsg = serde_json::from_str(&s).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn take_seat_round_trips() {
        let msg = ClientMsg::TableMgmt(table_mgmt::Msg::TakeSeat {
            seat: 3,
            buy_in: 1000.into(),
        });
        let s = serde_json::to_string(&msg).unwrap();
        let back: ClientMsg = serde_json::from_str(&s).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn server_error_round_trips() {
        let msg = ServerMsg::Error {
            message: "seat taken".into(),
        };
        let s = serde_json::to_string(&msg).unwrap();
        let back: ServerMsg = serde_json::from_str(&s).unwrap();
        assert_eq!(msg, back);
    }
}
