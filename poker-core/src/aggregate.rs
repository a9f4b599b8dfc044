//! The event-sourced wrapper around the Hand Engine. `TableAggregate` is the only thing allowed
//! to mutate a `Table`: every command either rejects outright (no state change, no event) or
//! succeeds by calling into the engine and appending one or more `DomainEvent`s whose version is
//! `currentVersion+1, +2, …`.
use crate::bet::BetAction;
use crate::currency::Currency;
use crate::engine::{State, Street};
use crate::events::{BetKind, DomainEvent, EventRecord, PotResult, WinType};
use crate::ids::{HandId, TableId, UserId};
use crate::pot::PotId;
use crate::table::{Blinds, BuyInRange, Table, TableConfig, TableStatus};
use crate::{engine::TableType, GameError, PlayerId};
use chrono::Utc;
use std::collections::HashMap;

/// Replays and records events for exactly one table. Holds the table's full state plus whatever
/// events have been appended since the last `mark_committed()`.
pub struct TableAggregate {
    table: Table,
    version: u64,
    uncommitted: Vec<EventRecord>,
    /// Users that have joined (via `add_player`) but may or may not be seated yet.
    joined: HashMap<UserId, Option<PlayerId>>,
    next_player_id: PlayerId,
    current_hand_id: Option<HandId>,
    /// Incremented every time action moves to a new seat; used to make autofold timers
    /// idempotent (`(handId, turnNumber)`).
    turn_number: u64,
}

impl TableAggregate {
    /// Start a brand-new aggregate and immediately record its `TableCreated` event. `version`
    /// becomes 1.
    pub fn create_table(
        id: TableId,
        name: String,
        table_type: TableType,
        max_players: u8,
        blinds: Blinds,
        created_by: Option<UserId>,
    ) -> Self {
        let table = Table::new(id, name.clone(), table_type, max_players, blinds);
        let mut agg = Self {
            table,
            version: 0,
            uncommitted: Vec::new(),
            joined: HashMap::new(),
            next_player_id: 1,
            current_hand_id: None,
            turn_number: 0,
        };
        agg.record(
            created_by,
            DomainEvent::TableCreated {
                name,
                table_type,
                max_players,
                small_blind: blinds.small_blind,
                big_blind: blinds.big_blind,
            },
        );
        agg
    }

    /// Rebuild an aggregate purely from its event history. `apply(apply(... initial, e1), e2)`
    /// must yield the same state as the command stream that originally produced `e1, e2, …`.
    pub fn load_from_history(id: TableId, events: Vec<EventRecord>) -> Result<Self, GameError> {
        let mut agg: Option<Self> = None;
        let mut version = 0u64;
        for record in events {
            version = record.version;
            match &mut agg {
                None => {
                    agg = Some(Self::apply_initial(id, &record.payload)?);
                }
                Some(a) => a.apply(&record.payload)?,
            }
        }
        let mut agg = agg.ok_or(GameError::InvalidAction)?;
        agg.version = version;
        agg.uncommitted.clear();
        Ok(agg)
    }

    fn apply_initial(id: TableId, event: &DomainEvent) -> Result<Self, GameError> {
        match event {
            DomainEvent::TableCreated {
                name,
                table_type,
                max_players,
                small_blind,
                big_blind,
            } => Ok(Self {
                table: Table::new(
                    id,
                    name.clone(),
                    *table_type,
                    *max_players,
                    Blinds {
                        small_blind: *small_blind,
                        big_blind: *big_blind,
                    },
                ),
                version: 0,
                uncommitted: Vec::new(),
                joined: HashMap::new(),
                next_player_id: 1,
                current_hand_id: None,
                turn_number: 0,
            }),
            _ => Err(GameError::InvalidAction),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The hand currently running, if any. Used by callers scheduling a `(handId, turnNumber)`
    /// action-timeout: a timer that fires after the hand has already ended is stale and should
    /// be discarded.
    pub fn current_hand_id(&self) -> Option<HandId> {
        self.current_hand_id
    }

    /// Monotonically increasing within a hand, incremented every time action moves to a new
    /// seat. Pairs with `current_hand_id()` to make autofold timers idempotent.
    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    pub fn uncommitted_changes(&self) -> &[EventRecord] {
        &self.uncommitted
    }

    pub fn mark_committed(&mut self) {
        self.uncommitted.clear();
    }

    fn record(&mut self, user_id: Option<UserId>, event: DomainEvent) {
        self.version += 1;
        let record = EventRecord::new(self.table.id, self.version, Utc::now(), user_id, event);
        self.apply(&record.payload).expect("self-produced event must apply cleanly");
        self.uncommitted.push(record);
    }

    /// Replay a single event against the in-memory state. Used both by freshly-recorded
    /// commands and by `load_from_history`.
    fn apply(&mut self, event: &DomainEvent) -> Result<(), GameError> {
        match event {
            DomainEvent::TableCreated { .. } => {}
            DomainEvent::PlayerJoined { user_id } => {
                self.joined.entry(*user_id).or_insert(None);
            }
            DomainEvent::PlayerSeated {
                user_id,
                seat,
                buy_in,
            } => {
                let player_id = self.next_player_id;
                self.next_player_id += 1;
                self.table
                    .game
                    .try_sit_at((*seat as usize) - 1, player_id, *buy_in)?;
                self.joined.insert(*user_id, Some(player_id));
            }
            DomainEvent::PlayerLeft { user_id, .. } => {
                self.joined.remove(user_id);
            }
            DomainEvent::HandStarted {
                hand_id, deck_seed, ..
            } => {
                self.current_hand_id = Some(*hand_id);
                self.turn_number = 0;
                self.table.game.start_hand_with_seed(*deck_seed)?;
                self.table.status = TableStatus::Active;
            }
            DomainEvent::CardsDealt { .. } => {}
            DomainEvent::CommunityCardsDealt { .. } => {}
            DomainEvent::PlayerAction {
                player_id, action, ..
            } => {
                self.turn_number += 1;
                let bet_action = match action {
                    BetKind::Check => BetAction::Check,
                    BetKind::Fold => BetAction::Fold,
                    BetKind::Call => BetAction::Call(self.table.game.current_bet()),
                    BetKind::Bet => match event {
                        DomainEvent::PlayerAction { amount, .. } => BetAction::Bet(*amount),
                        _ => unreachable!(),
                    },
                    BetKind::Raise => match event {
                        DomainEvent::PlayerAction { amount, .. } => BetAction::Raise(*amount),
                        _ => unreachable!(),
                    },
                    BetKind::AllIn => match event {
                        DomainEvent::PlayerAction { amount, .. } => BetAction::AllIn(*amount),
                        _ => unreachable!(),
                    },
                };
                self.table.game.player_action(*player_id, bet_action)?;
            }
            DomainEvent::HandEnded { .. } => {
                self.table.status = TableStatus::Waiting;
            }
            DomainEvent::BuyIn { .. }
            | DomainEvent::CashOut { .. }
            | DomainEvent::WinningsDistributed { .. }
            | DomainEvent::MoneyMovementFailed { .. } => {}
        }
        Ok(())
    }

    /// The seated `PlayerId` for a joined user, if any. `None` covers both "never joined" and
    /// "joined but not yet seated" — callers that need to distinguish those check `add_player`'s
    /// error instead.
    pub fn player_id_for(&self, user_id: UserId) -> Option<PlayerId> {
        self.joined.get(&user_id).copied().flatten()
    }

    /// Reverse of `player_id_for`, needed wherever a `DomainEvent` or pot result names a seated
    /// `PlayerId` and the caller needs the owning user's ledger sub-account.
    pub fn user_id_for(&self, player_id: PlayerId) -> Option<UserId> {
        self.joined
            .iter()
            .find(|(_, seated)| **seated == Some(player_id))
            .map(|(user_id, _)| *user_id)
    }

    /// 1-indexed seat number for a seated user, for view-building callers that need to find
    /// "which `SeatView` is mine" without reaching into `Players` directly.
    pub fn seat_number_for(&self, user_id: UserId) -> Option<u8> {
        let player_id = self.player_id_for(user_id)?;
        self.table
            .game
            .players
            .players_iter(crate::player::PlayerFilter::ALL)
            .find(|(_, p)| p.id == player_id)
            .map(|(seat_idx, _)| (seat_idx + 1) as u8)
    }

    pub fn add_player(&mut self, user_id: UserId) -> Result<(), GameError> {
        if self.joined.contains_key(&user_id) {
            return Err(GameError::PlayerAlreadySeated);
        }
        self.record(Some(user_id), DomainEvent::PlayerJoined { user_id });
        Ok(())
    }

    /// `seat` is 1-indexed, per the spec's seat numbering (`1..maxPlayers`).
    pub fn seat_player(
        &mut self,
        user_id: UserId,
        seat: u8,
        buy_in: Currency,
    ) -> Result<(), GameError> {
        match self.joined.get(&user_id) {
            None => return Err(GameError::PlayerNotFound),
            Some(Some(_)) => return Err(GameError::PlayerAlreadySeated),
            Some(None) => {}
        }
        if seat < 1 || seat > self.table.max_players {
            return Err(GameError::InvalidSeat);
        }
        if !self.table.buy_in_range.contains(buy_in) {
            return Err(GameError::InvalidBuyIn);
        }
        self.record(
            Some(user_id),
            DomainEvent::PlayerSeated {
                user_id,
                seat,
                buy_in,
            },
        );
        Ok(())
    }

    pub fn remove_player(&mut self, user_id: UserId, final_chips: Currency) -> Result<(), GameError> {
        if !self.joined.contains_key(&user_id) {
            return Err(GameError::PlayerNotFound);
        }
        self.record(
            Some(user_id),
            DomainEvent::PlayerLeft {
                user_id,
                final_chips,
            },
        );
        Ok(())
    }

    pub fn start_hand(&mut self) -> Result<(), GameError> {
        if !matches!(self.table.game.state(), State::NotStarted | State::EndOfHand) {
            return Err(GameError::GameNotRunning);
        }
        let hand_id = HandId::new();
        let seed = crate::cards::DeckSeed::default();
        self.record(
            None,
            DomainEvent::HandStarted {
                hand_id,
                // Placeholder: `apply()` rotates the tokens as a side effect of this very
                // event, so we can only learn the real seats once it has run. Patched below.
                dealer_seat: 0,
                sb_seat: 0,
                bb_seat: 0,
                deck_seed: seed,
            },
        );
        // Now that `apply` has rotated the tokens, patch the just-recorded event with the real
        // seat numbers so the stored record is self-describing.
        let dealer_seat = (self.table.game.players.token_dealer + 1) as u8;
        let sb_seat = (self.table.game.players.token_sb + 1) as u8;
        let bb_seat = (self.table.game.players.token_bb + 1) as u8;
        if let Some(last) = self.uncommitted.last_mut() {
            if let DomainEvent::HandStarted {
                dealer_seat: d,
                sb_seat: s,
                bb_seat: b,
                ..
            } = &mut last.payload
            {
                *d = dealer_seat;
                *s = sb_seat;
                *b = bb_seat;
            }
        }
        let dealt: Vec<_> = self
            .table
            .game
            .players
            .players_iter(crate::player::PlayerFilter::ALL)
            .filter_map(|(_, p)| p.pocket.map(|c| (p.id, c)))
            .collect();
        for (player_id, cards) in dealt {
            self.append_raw(DomainEvent::CardsDealt {
                hand_id,
                player_id,
                cards,
            });
        }
        Ok(())
    }

    /// Appends an event that was produced as a side effect of an `apply()` call already made
    /// (e.g. the deal that happens inside `start_hand`), without re-running `apply` — the engine
    /// already did that work. Only used for events whose `apply` arm is a no-op.
    fn append_raw(&mut self, event: DomainEvent) {
        self.version += 1;
        let record = EventRecord::new(self.table.id, self.version, Utc::now(), None, event);
        self.uncommitted.push(record);
    }

    pub fn player_action(
        &mut self,
        player_id: PlayerId,
        kind: BetKind,
        amount: Currency,
    ) -> Result<(), GameError> {
        let hand_id = self.current_hand_id.ok_or(GameError::GameNotRunning)?;
        let bet_action = match kind {
            BetKind::Check => BetAction::Check,
            BetKind::Fold => BetAction::Fold,
            BetKind::Call => BetAction::Call(self.table.game.current_bet()),
            BetKind::Bet => BetAction::Bet(amount),
            BetKind::Raise => BetAction::Raise(amount),
            BetKind::AllIn => BetAction::AllIn(amount),
        };
        // Validate first without mutating: `bet()` inside the engine is the sole authority on
        // legality, so we dry-run through a clone to compute the event payload, then record.
        let mut probe = self.table.game.clone();
        probe.player_action(player_id, bet_action)?;
        let player = probe
            .players
            .player_by_id(player_id)
            .expect("player just acted, must exist");
        let total_bet = player.total_bet;
        let remaining_chips = player.stack;
        let is_allin = player.is_allin();
        let community_before = self.table.game.community;

        self.record(
            None,
            DomainEvent::PlayerAction {
                hand_id,
                player_id,
                action: kind,
                amount,
                total_bet,
                remaining_chips,
                is_allin,
            },
        );

        // If the engine dealt new community cards as a side effect, surface them too. Snapshot
        // both sides as owned data up front so nothing here still borrows `self` once we need
        // to call back into it with `append_raw`.
        let community_after = self.table.game.community;
        let stages = [
            (Street::Flop, 0usize, 3usize),
            (Street::Turn, 3, 4),
            (Street::River, 4, 5),
        ];
        for (stage, start, end) in stages {
            let before = &community_before[start..end];
            let after = &community_after[start..end];
            if before.iter().all(|c| c.is_none()) && after.iter().all(|c| c.is_some()) {
                self.append_raw(DomainEvent::CommunityCardsDealt {
                    hand_id,
                    stage,
                    cards: after.iter().filter_map(|c| *c).collect(),
                });
            }
        }

        if matches!(self.table.game.state(), State::EndOfHand) {
            let pots = self.table.game.pots_snapshot();
            let payouts = self.table.game.last_hand_payouts();
            let winners_for = |pot_id: PotId| -> Vec<PlayerId> {
                payouts
                    .iter()
                    .find(|(id, _)| *id == pot_id)
                    .map(|(_, winners)| winners.iter().map(|(pid, _)| *pid).collect())
                    .unwrap_or_default()
            };
            let pot_results: Vec<PotResult> = pots
                .iter()
                .enumerate()
                .map(|(i, (id, amount, eligible))| PotResult {
                    id: *id,
                    amount: *amount,
                    is_side: i > 0,
                    eligible_players: eligible.clone(),
                    winners: winners_for(*id),
                })
                .collect();
            let mut winners: Vec<PlayerId> =
                pot_results.iter().flat_map(|p| p.winners.iter().copied()).collect();
            winners.sort_unstable();
            winners.dedup();
            let win_type = if pot_results.len() <= 1
                && self
                    .table
                    .game
                    .players
                    .players_iter(crate::player::PlayerFilter::POT_ELIGIBLE)
                    .count()
                    == 1
            {
                WinType::Fold
            } else {
                WinType::Showdown
            };
            self.append_raw(DomainEvent::HandEnded {
                hand_id,
                winners,
                pots: pot_results,
                win_type,
            });
            self.current_hand_id = None;
        }

        Ok(())
    }

    pub fn config(&self) -> &TableConfig {
        &self.table.config
    }

    pub fn buy_in_range(&self) -> &BuyInRange {
        &self.table.buy_in_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_table() -> TableAggregate {
        TableAggregate::create_table(
            TableId::new(),
            "test-table".into(),
            TableType::Cash,
            2,
            Blinds {
                small_blind: 5.into(),
                big_blind: 10.into(),
            },
            None,
        )
    }

    #[test]
    fn create_table_emits_one_event_at_version_one() {
        let agg = new_table();
        assert_eq!(agg.version(), 1);
        assert_eq!(agg.uncommitted_changes().len(), 1);
        assert!(matches!(
            agg.uncommitted_changes()[0].payload,
            DomainEvent::TableCreated { .. }
        ));
    }

    #[test]
    fn seat_player_rejects_buy_in_outside_range() {
        let mut agg = new_table();
        let user = UserId::new();
        agg.add_player(user).unwrap();
        // default range for bb=10 is [200, 2000]
        let err = agg.seat_player(user, 1, 100.into()).unwrap_err();
        assert!(matches!(err, GameError::InvalidBuyIn));
    }

    #[test]
    fn seat_player_rejects_unjoined_user() {
        let mut agg = new_table();
        let err = agg.seat_player(UserId::new(), 1, 1000.into()).unwrap_err();
        assert!(matches!(err, GameError::PlayerNotFound));
    }

    #[test]
    fn replay_reproduces_identical_version_and_seating() {
        let mut agg = new_table();
        let u1 = UserId::new();
        let u2 = UserId::new();
        agg.add_player(u1).unwrap();
        agg.add_player(u2).unwrap();
        agg.seat_player(u1, 1, 1000.into()).unwrap();
        agg.seat_player(u2, 2, 1000.into()).unwrap();
        agg.start_hand().unwrap();

        let history: Vec<_> = agg.uncommitted_changes().to_vec();
        let replayed = TableAggregate::load_from_history(agg.table.id, history).unwrap();
        assert_eq!(replayed.version(), agg.version());
        assert_eq!(
            replayed.table.game.players.player_by_id(1).unwrap().stack,
            agg.table.game.players.player_by_id(1).unwrap().stack
        );
    }
}
