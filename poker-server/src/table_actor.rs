//! Single-writer loop owning one table's in-memory aggregate. The teacher has no actor of its
//! own — Rocket handlers mutated `GameState` synchronously per request — so this is built fresh
//! in the shape the wider pack uses for the same problem: a `tokio::sync::mpsc` mailbox plus
//! `Duration` timer constants, the pattern `vincev-freezeout`'s table `State`/`HandState` loop
//! follows, adapted to drive `poker_core::aggregate::TableAggregate` and this crate's event
//! store / ledger instead of mutating game state inline.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::sleep;

use poker_core::aggregate::TableAggregate;
use poker_core::engine::TableType;
use poker_core::events::{BetKind, DomainEvent};
use poker_core::ids::{SessionId, TableId, UserId};
use poker_core::player::PlayerFilter;
use poker_core::table::Blinds;
use poker_core::{Currency, GameError, PlayerId};
use poker_messages::view::SessionInfo;
use poker_messages::ServerMsg;

use crate::config::Settings;
use crate::database::DbConn;
use crate::error::ServerError;
use crate::ledger::{self, Account};
use crate::session_registry::SessionRegistry;
use crate::{event_store, view};

/// Reply channel embedded in every command — the teacher's request/response idiom (a Rocket
/// handler awaiting a DB call) generalized to an actor mailbox.
type Reply<T> = oneshot::Sender<Result<T, ServerError>>;

pub enum Command {
    AddPlayer {
        user_id: UserId,
        reply: Reply<()>,
    },
    SeatPlayer {
        user_id: UserId,
        seat: u8,
        buy_in: Currency,
        reply: Reply<()>,
    },
    RemovePlayer {
        user_id: UserId,
        reply: Reply<()>,
    },
    StartHand {
        reply: Reply<()>,
    },
    PlayerAction {
        user_id: UserId,
        kind: BetKind,
        amount: Currency,
        reply: Reply<()>,
    },
    /// A subscriber woke up on a broadcast change-notification and wants its own personalized
    /// `UpdateGame` (own hole cards revealed, own `SessionInfo` attached) rather than the bare
    /// signal every subscriber gets.
    BuildView {
        user_id: UserId,
        reply: Reply<ServerMsg>,
    },
    /// Internal: the auto-start timer fired. Silently ignored if a hand is already running.
    AutoStartTimer,
    /// Internal: a per-turn action-timeout fired. Discarded if `hand_id`/`turn_number` no longer
    /// match the aggregate's current turn (someone already acted).
    AutoFoldTimer {
        player_id: PlayerId,
        hand_id: poker_core::ids::HandId,
        turn_number: u64,
    },
}

const MAX_CONFLICT_RETRIES: usize = 3;

pub struct TableActor {
    aggregate: TableAggregate,
    db: DbConn,
    registry: Arc<SessionRegistry>,
    /// Fires on every state change. Carries no payload: the aggregate's state (including hole
    /// cards) only leaves this actor through `Command::BuildView`, which tailors the view to the
    /// asking `user_id` instead of broadcasting one shared, unredacted payload to every socket.
    broadcast_tx: broadcast::Sender<()>,
    settings: Settings,
    mailbox: mpsc::Receiver<Command>,
    self_tx: mpsc::Sender<Command>,
    /// `UserId -> SessionId`, populated as players buy in; needed to translate a `PlayerId`-keyed
    /// `WinningsDistributed` posting back into `session:<user>:<session>` ledger accounts.
    sessions_by_user: HashMap<UserId, SessionId>,
}

#[derive(Clone)]
pub struct TableHandle {
    pub command_tx: mpsc::Sender<Command>,
    pub broadcast_rx: broadcast::Sender<()>,
}

impl TableActor {
    /// Spawns a brand-new table and its actor task, returning a handle clients can send
    /// commands through and subscribe to for broadcasts.
    pub fn spawn_new(
        table_id: TableId,
        name: String,
        table_type: TableType,
        max_players: u8,
        blinds: Blinds,
        db: DbConn,
        registry: Arc<SessionRegistry>,
        settings: Settings,
    ) -> TableHandle {
        let aggregate = TableAggregate::create_table(table_id, name, table_type, max_players, blinds, None);
        Self::spawn(aggregate, db, registry, settings)
    }

    /// Spawns an actor that replays an existing table's history before serving commands.
    pub async fn spawn_from_history(
        table_id: TableId,
        db: DbConn,
        registry: Arc<SessionRegistry>,
        settings: Settings,
    ) -> Result<TableHandle, ServerError> {
        let stored = event_store::load(&db, table_id).await?;
        let events = stored.into_iter().map(|s| to_event_record(table_id, s)).collect();
        let aggregate = TableAggregate::load_from_history(table_id, events).map_err(ServerError::from)?;
        Ok(Self::spawn(aggregate, db, registry, settings))
    }

    fn spawn(
        aggregate: TableAggregate,
        db: DbConn,
        registry: Arc<SessionRegistry>,
        settings: Settings,
    ) -> TableHandle {
        let (command_tx, mailbox) = mpsc::channel(256);
        let (broadcast_tx, _) = broadcast::channel(256);
        let handle = TableHandle { command_tx: command_tx.clone(), broadcast_rx: broadcast_tx.clone() };
        let actor = Self {
            aggregate,
            db,
            registry,
            broadcast_tx,
            settings,
            mailbox,
            self_tx: command_tx,
            sessions_by_user: HashMap::new(),
        };
        tokio::spawn(actor.run());
        handle
    }

    async fn run(mut self) {
        info!("table actor starting for {}", self.aggregate.table().id);
        while let Some(command) = self.mailbox.recv().await {
            self.handle(command).await;
        }
        info!("table actor for {} shutting down", self.aggregate.table().id);
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::AddPlayer { user_id, reply } => {
                let result = self.run_command(|agg| agg.add_player(user_id)).await;
                let _ = reply.send(result);
            }
            Command::SeatPlayer { user_id, seat, buy_in, reply } => {
                let result = self.seat_player(user_id, seat, buy_in).await;
                let _ = reply.send(result);
            }
            Command::RemovePlayer { user_id, reply } => {
                let result = self.remove_player(user_id).await;
                let _ = reply.send(result);
            }
            Command::StartHand { reply } => {
                let result = self.start_hand().await;
                let _ = reply.send(result);
            }
            Command::PlayerAction { user_id, kind, amount, reply } => {
                let result = self.player_action(user_id, kind, amount).await;
                let _ = reply.send(result);
            }
            Command::BuildView { user_id, reply } => {
                let msg = self.build_view_for(user_id).await;
                let _ = reply.send(Ok(msg));
            }
            Command::AutoStartTimer => {
                if matches!(self.aggregate.table().game.state(), poker_core::engine::State::NotStarted | poker_core::engine::State::EndOfHand)
                {
                    if let Err(e) = self.start_hand().await {
                        debug!("auto-start skipped: {e}");
                    }
                }
            }
            Command::AutoFoldTimer { player_id, hand_id, turn_number } => {
                if self.aggregate.current_hand_id() != Some(hand_id)
                    || self.aggregate.turn_number() != turn_number
                {
                    debug!("autofold timer for {player_id} stale, discarding");
                    return;
                }
                if let Err(e) = self
                    .run_command(|agg| agg.player_action(player_id, BetKind::Fold, Currency::ZERO))
                    .await
                {
                    warn!("autofold for {player_id} failed: {e}");
                }
            }
        }
    }

    /// Step 1-5, 7-8 of the actor loop for commands that only touch the aggregate (no ledger
    /// involvement): dequeue already happened, this runs validate-apply-persist-publish with the
    /// conflict-retry policy.
    async fn run_command(
        &mut self,
        op: impl Fn(&mut TableAggregate) -> Result<(), GameError>,
    ) -> Result<(), ServerError> {
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            let expected_version = self.aggregate.version();
            op(&mut self.aggregate).map_err(ServerError::from)?;
            match self.persist().await {
                Ok(()) => {
                    self.aggregate.mark_committed();
                    self.publish().await;
                    return Ok(());
                }
                Err(ServerError::ConcurrencyConflict) if attempt < MAX_CONFLICT_RETRIES => {
                    warn!(
                        "version conflict on table {} at expected_version={expected_version}, reloading",
                        self.aggregate.table().id
                    );
                    self.reload().await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(ServerError::ConcurrencyConflict)
    }

    async fn persist(&mut self) -> Result<(), ServerError> {
        let table_id = self.aggregate.table().id;
        let starting_version = self.aggregate.version() - self.aggregate.uncommitted_changes().len() as u64;
        let batch = self
            .aggregate
            .uncommitted_changes()
            .iter()
            .map(|record| (record.user_id, record.payload.clone()))
            .collect();
        event_store::append(&self.db, table_id, starting_version, batch).await
    }

    async fn reload(&mut self) -> Result<(), ServerError> {
        let table_id = self.aggregate.table().id;
        let stored = event_store::load(&self.db, table_id).await?;
        let events = stored.into_iter().map(|s| to_event_record(table_id, s)).collect();
        self.aggregate = TableAggregate::load_from_history(table_id, events)?;
        Ok(())
    }

    async fn publish(&mut self) {
        let _ = self.broadcast_tx.send(());

        for record in self.aggregate.uncommitted_changes().to_vec() {
            if let DomainEvent::HandEnded { .. } = &record.payload {
                self.schedule_auto_start();
            }
        }
        self.schedule_action_timeout();
    }

    /// Builds `user_id`'s personalized view: their own hole cards revealed, everyone else's
    /// redacted, plus their `SessionInfo` per spec.md §6's `update-game` shape.
    async fn build_view_for(&self, user_id: UserId) -> ServerMsg {
        let mut view = view::build_game_view(&self.aggregate);
        if let Some(seat) = self.aggregate.seat_number_for(user_id) {
            view = view::reveal_own_cards(view, &self.aggregate, seat);
        }

        let table_id = self.aggregate.table().id;
        let session = self.registry.get_active(user_id, table_id).await;
        let session_info = Some(SessionInfo {
            user_id,
            session_id: session.as_ref().map(|s| s.id),
            seat_number: session.as_ref().and_then(|s| s.seat_number),
            is_seated: session.as_ref().map_or(false, |s| s.seat_number.is_some()),
            has_session: session.is_some(),
        });

        ServerMsg::UpdateGame { view, session_info }
    }

    fn schedule_auto_start(&self) {
        let delay = Duration::from_secs(self.settings.auto_start_delay_secs as u64);
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Command::AutoStartTimer).await;
        });
    }

    fn schedule_action_timeout(&self) {
        let (hand_id, player) = match (self.aggregate.current_hand_id(), self.aggregate.table().game.nta()) {
            (Some(hand_id), Some((_, player))) => (hand_id, player),
            _ => return,
        };
        let turn_number = self.aggregate.turn_number();
        let delay = Duration::from_secs(self.settings.action_timeout_secs as u64);
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx
                .send(Command::AutoFoldTimer { player_id: player.id, hand_id, turn_number })
                .await;
        });
    }

    async fn seat_player(&mut self, user_id: UserId, seat: u8, buy_in: Currency) -> Result<(), ServerError> {
        let table_id = self.aggregate.table().id;
        let session = self
            .registry
            .create(user_id, table_id, buy_in)
            .await
            .ok_or(ServerError::SessionExists)?;

        if !ledger::validate_main_balance(&self.db, user_id, buy_in).await? {
            self.registry.abandon(user_id, table_id).await;
            return Err(ServerError::InsufficientFunds);
        }

        self.run_command(|agg| agg.seat_player(user_id, seat, buy_in)).await?;

        let tx_id = uuid::Uuid::new_v4();
        if let Err(e) = ledger::transfer_to_game(&self.db, tx_id, user_id, session.id, buy_in).await {
            error!("buy-in transfer failed for {user_id} after seating: {e}");
            self.compensate(vec![tx_id.to_string()], e.to_string()).await;
            return Err(e);
        }

        self.sessions_by_user.insert(user_id, session.id);
        self.registry.set_seat(user_id, table_id, seat).await;
        Ok(())
    }

    async fn remove_player(&mut self, user_id: UserId) -> Result<(), ServerError> {
        let table_id = self.aggregate.table().id;
        let current_chips = self
            .aggregate
            .player_id_for(user_id)
            .and_then(|pid| self.aggregate.table().game.players.player_by_id(pid))
            .map(|p| p.stack)
            .unwrap_or(Currency::ZERO);

        self.run_command(|agg| agg.remove_player(user_id, current_chips)).await?;

        if let Some(session) = self.sessions_by_user.get(&user_id).copied() {
            let tx = uuid::Uuid::new_v4();
            if let Err(e) = ledger::transfer_from_game(&self.db, tx, user_id, session, current_chips).await {
                error!("cash-out transfer failed for {user_id}: {e}");
                self.compensate(vec![tx.to_string()], e.to_string()).await;
                return Err(e);
            }
            self.registry.finish(user_id, table_id, current_chips).await;
        }
        Ok(())
    }

    async fn start_hand(&mut self) -> Result<(), ServerError> {
        self.run_command(|agg| agg.start_hand()).await
    }

    async fn player_action(
        &mut self,
        user_id: UserId,
        kind: BetKind,
        amount: Currency,
    ) -> Result<(), ServerError> {
        let player_id = self
            .aggregate
            .player_id_for(user_id)
            .ok_or(ServerError::Game(GameError::PlayerNotFound))?;

        for attempt in 0..=MAX_CONFLICT_RETRIES {
            self.aggregate
                .player_action(player_id, kind, amount)
                .map_err(ServerError::from)?;
            match self.persist().await {
                Ok(()) => {
                    let hand_ended = self.aggregate.uncommitted_changes().iter().rev().find_map(|r| {
                        match &r.payload {
                            DomainEvent::HandEnded { hand_id, pots, .. } => {
                                Some((*hand_id, pots.clone()))
                            }
                            _ => None,
                        }
                    });
                    self.aggregate.mark_committed();
                    self.publish().await;
                    if let Some((hand_id, pots)) = hand_ended {
                        self.settle_hand(hand_id, pots).await;
                    }
                    return Ok(());
                }
                Err(ServerError::ConcurrencyConflict) if attempt < MAX_CONFLICT_RETRIES => {
                    warn!("version conflict applying player action, reloading and retrying");
                    self.reload().await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(ServerError::ConcurrencyConflict)
    }

    /// Step 6 for `HandEnded`: post one `distribute_winnings` per pot plus rake, and surface a
    /// compensating `MoneyMovementFailed` on any ledger error — the aggregate's own events are
    /// already durably committed by this point, so the hand itself is not rolled back; only the
    /// money movement is retried/escalated for operator review.
    async fn settle_hand(
        &mut self,
        hand_id: poker_core::ids::HandId,
        pots: Vec<poker_core::events::PotResult>,
    ) {
        let rake_rate = self.settings.rake_policy.percentage;
        for pot in pots {
            if pot.winners.is_empty() {
                continue;
            }
            let losers: Vec<PlayerId> = pot
                .eligible_players
                .iter()
                .copied()
                .filter(|pid| !pot.winners.contains(pid))
                .collect();
            if losers.is_empty() {
                // A chop among all eligible players: everyone gets their own stake back, no net
                // ledger movement needed.
                continue;
            }
            let winner_share = Currency::from_cents(pot.amount.cents() / pot.winners.len() as i64);
            // Evenly split each pot amount across every (loser, winner) leg pair; remainders
            // from integer division are small and left uncollected rather than tracked further.
            let leg_share = Currency::from_cents(
                pot.amount.cents() / (losers.len() as i64 * pot.winners.len() as i64),
            );

            let mut legs = Vec::new();
            for winner_pid in &pot.winners {
                if let Some(winner_account) = self.account_for_player(*winner_pid) {
                    for loser_pid in &losers {
                        if let Some(loser_account) = self.account_for_player(*loser_pid) {
                            legs.push((loser_account, winner_account, leg_share));
                        }
                    }
                }
            }

            if let Err(e) = ledger::distribute_winnings(&self.db, hand_id, pot.id, legs).await {
                error!("distributeWinnings failed for pot {}: {e}", pot.id);
                self.compensate(vec![format!("hand={hand_id} pot={}", pot.id)], e.to_string())
                    .await;
                continue;
            }

            if rake_rate > 0.0 {
                for winner_pid in &pot.winners {
                    let user_id = match self.aggregate.user_id_for(*winner_pid) {
                        Some(u) => u,
                        None => continue,
                    };
                    let session = match self.sessions_by_user.get(&user_id).copied() {
                        Some(s) => s,
                        None => continue,
                    };
                    let rake_amount =
                        Currency::from_cents(((winner_share.cents() as f64) * rake_rate) as i64);
                    if rake_amount > Currency::ZERO {
                        if let Err(e) =
                            ledger::collect_rake(&self.db, hand_id, user_id, session, rake_amount).await
                        {
                            error!("collectRake failed for hand {hand_id}, user {user_id}: {e}");
                            self.compensate(
                                vec![format!("hand={hand_id} rake user={user_id}")],
                                e.to_string(),
                            )
                            .await;
                        }
                    }
                }
            }
        }

        self.sync_session_chips().await;
    }

    /// Step 6's closing move: the engine already moved chips between in-memory player stacks
    /// when the hand settled, so mirror that into the session registry's `currentChips` per
    /// spec.md §4.5 rather than leaving it stuck at the buy-in amount for the session's life.
    async fn sync_session_chips(&self) {
        let table_id = self.aggregate.table().id;
        let stacks: Vec<(UserId, Currency)> = self
            .aggregate
            .table()
            .game
            .players
            .players_iter(PlayerFilter::ALL)
            .filter_map(|(_, p)| self.aggregate.user_id_for(p.id).map(|uid| (uid, p.stack)))
            .collect();
        for (user_id, stack) in stacks {
            self.registry.update_chips(user_id, table_id, stack).await;
        }
    }

    fn account_for_player(&self, player_id: PlayerId) -> Option<Account> {
        let user_id = self.aggregate.user_id_for(player_id)?;
        let session_id = *self.sessions_by_user.get(&user_id)?;
        Some(Account::Session(user_id, session_id))
    }

    async fn compensate(&mut self, tx_refs: Vec<String>, reason: String) {
        warn!("compensating money-movement failure: {reason}");
        let table_id = self.aggregate.table().id;
        let version = self.aggregate.version();
        let payload = DomainEvent::MoneyMovementFailed { tx_refs, reason };
        if let Err(e) = event_store::append(&self.db, table_id, version, vec![(None, payload)]).await {
            error!("failed to persist compensating event: {e}");
        }
    }
}

fn to_event_record(
    table_id: TableId,
    stored: event_store::StoredEvent,
) -> poker_core::events::EventRecord {
    poker_core::events::EventRecord {
        id: stored.id,
        aggregate_id: table_id,
        version: stored.version,
        timestamp: stored.timestamp,
        user_id: stored.user_id,
        payload: stored.payload,
    }
}

/// House rake account helper for `Account::Rake`, re-exported so `table_actor` callers (the
/// `hub`) don't need to import `ledger::Account` just to read a balance.
pub async fn house_rake_balance(db: &DbConn) -> Result<Currency, ServerError> {
    ledger::get_balance(db, Account::Rake).await
}
