//! The hand engine: a pure state machine for one hand of Texas Hold'em. No I/O, no async — it
//! only knows about seats, cards, and chips. The `TableAggregate` drives it by replaying
//! `DomainEvent`s and recording the `DomainEvent`s its own mutating methods imply.
use crate::bet::BetAction;
use crate::cards::{best_hands, Card, Deck, DeckSeed};
use crate::currency::Currency;
use crate::log::{Log, LogItem};
use crate::player::{Player, PlayerFilter, Players};
use crate::pot::{Pot, PotId};
use crate::{GameError, PlayerId, SeatIdx, SeqNum, MAX_PLAYERS};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

const COMMUNITY_SIZE: usize = 5;
const DEF_SB: Currency = Currency::from_cents(5);
const DEF_BB: Currency = Currency::from_cents(10);

type PidBA = (PlayerId, BetAction);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum TableType {
    Cash,
    Tournament,
    SitAndGo,
}

impl Default for TableType {
    fn default() -> Self {
        Self::Cash
    }
}

/// A snapshot of seating taken right before a new hand's state overwrites the old one, so the
/// hand log can show "here's what the table looked like going into this hand."
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table_type: TableType,
    pub seats: [Option<Player>; MAX_PLAYERS],
}

impl std::fmt::Display for TableSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {}",
            self.table_type,
            self.seats.iter().filter(|p| p.is_some()).count()
        )
    }
}

impl From<&mut GameState> for TableSnapshot {
    fn from(gs: &mut GameState) -> Self {
        let mut seats = [None; MAX_PLAYERS];
        let seats = {
            for (idx, p) in gs.players.players_iter(PlayerFilter::ALL) {
                seats[idx] = Some(*p);
            }
            seats
        };
        Self {
            table_type: gs.table_type,
            seats,
        }
    }
}

/// States a hand can be in: not even started, dealing, a betting street, showdown, or over.
#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum State {
    NotStarted,
    Dealing,
    Street(Street),
    Showdown,
    EndOfHand,
}

impl Default for State {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

/// All the state constituting a poker hand in progress.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    __state_dont_change_directly: State,
    /// Cash / tournament / sit-and-go. Only affects buy-in and rake policy above this layer;
    /// the betting state machine itself never branches on it.
    pub table_type: TableType,
    /// The players seated at this table and their per-player info.
    pub players: Players,
    /// The community cards.
    pub community: [Option<Card>; COMMUNITY_SIZE],
    /// Management of the pot and any side pots.
    pot: Pot,
    /// The deck, obviously.
    deck: Deck,
    small_blind: Currency,
    big_blind: Currency,
    /// The amount each player must match to see the end of the current betting round.
    __current_bet_dont_change_directly: Currency,
    /// If a player wishes to raise this round, they must raise to at least this amount. This is
    /// the total amount to raise to, i.e. larger than `current_bet`.
    __min_raise_dont_change_directly: Currency,
    /// The last person to raise this betting round.
    ///
    /// Needed because of the full bet rule: you can't raise, have action come back to you, then
    /// raise again without someone raising after your first raise. Action can come back to you
    /// like this if someone goes all in for less than the minimum raise after your first raise.
    last_raiser: Option<PlayerId>,
    /// Logs since the start of this hand and an archive of some previous hands.
    logs: Log,
    /// Per-pot winners from the most recently finalized hand, set by `finalize_hand` and read
    /// back by `TableAggregate::record_action` when it builds the `HandEnded` event. Sorted by
    /// player id within each pot so replay is deterministic regardless of `HashMap` iteration
    /// order.
    last_hand_payouts: Vec<(PotId, Vec<(PlayerId, Currency)>)>,
}

impl GameState {
    pub fn filtered_changes_since(
        &self,
        seq: SeqNum,
        player_id: PlayerId,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + '_ {
        self.logs
            .items_since(seq)
            .map(move |(idx, item)| match item {
                LogItem::Pot(_)
                | LogItem::NewHandSnapshot(_)
                | LogItem::StateChange(_, _)
                | LogItem::TokensSet(_, _, _)
                | LogItem::NextToAct(_)
                | LogItem::CurrentBetSet(_, _, _, _)
                | LogItem::HandReveal(_, _)
                | LogItem::Flop(_, _, _)
                | LogItem::Turn(_)
                | LogItem::River(_) => (idx, item),
                LogItem::PocketDealt(pid, _pocket) => {
                    if pid == player_id {
                        (idx, item)
                    } else {
                        (idx, LogItem::PocketDealt(pid, None))
                    }
                }
            })
    }

    pub fn pot_total_value(&self) -> Currency {
        self.pot.total_value()
    }

    pub fn pots_snapshot(&self) -> Vec<(PotId, Currency, Vec<PlayerId>)> {
        self.pot.settled_snapshot()
    }

    /// Which players won (a share of) each settled pot in the hand that just ended, set by
    /// `finalize_hand`. Empty until the first hand finishes.
    pub fn last_hand_payouts(&self) -> &[(PotId, Vec<(PlayerId, Currency)>)] {
        &self.last_hand_payouts
    }

    /// Next to act: the seat index and a copy of that player, if a bet is outstanding.
    pub fn nta(&self) -> Option<(SeatIdx, Player)> {
        match self.players.need_bets_from.is_empty() {
            false => {
                let idx = self.players.need_bets_from[self.players.need_bets_from.len() - 1];
                let p = self.players.players[idx].unwrap();
                Some((idx, p))
            }
            true => None,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            __state_dont_change_directly: Default::default(),
            table_type: Default::default(),
            players: Default::default(),
            community: [None; COMMUNITY_SIZE],
            pot: Default::default(),
            deck: Default::default(),
            small_blind: DEF_SB,
            big_blind: DEF_BB,
            __current_bet_dont_change_directly: DEF_BB,
            __min_raise_dont_change_directly: DEF_BB + DEF_BB,
            last_raiser: None,
            logs: Default::default(),
            last_hand_payouts: Vec::new(),
        }
    }
}

impl GameState {
    /// Build a table with the given blinds instead of the defaults.
    pub fn with_blinds(small_blind: Currency, big_blind: Currency) -> Self {
        Self {
            small_blind,
            big_blind,
            __current_bet_dont_change_directly: big_blind,
            __min_raise_dont_change_directly: big_blind * 2,
            ..Default::default()
        }
    }

    pub fn player_folds(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Fold)
    }

    pub fn player_calls(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Call(self.current_bet()))
    }

    pub fn player_checks(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Check)
    }

    pub fn player_bets(&mut self, player_id: PlayerId, val: Currency) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Bet(val))
    }

    pub fn player_raises(&mut self, player_id: PlayerId, val: Currency) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Raise(val))
    }

    pub fn player_action(
        &mut self,
        player_id: PlayerId,
        bet_action: BetAction,
    ) -> Result<(), GameError> {
        let bet = self.bet(player_id, bet_action)?;
        let bet_value = match bet {
            BetAction::Check | BetAction::Fold => Currency::ZERO,
            BetAction::Call(v) | BetAction::Bet(v) | BetAction::Raise(v) | BetAction::AllIn(v) => v,
        };
        if bet_value > self.current_bet() {
            let old_cb = self.current_bet();
            let cb = bet_value;
            let mr = cb + (cb - old_cb);
            self.set_current_bet(cb, mr);
        }
        self.pot.bet(player_id, bet);

        if self
            .players
            .players_iter(PlayerFilter::POT_ELIGIBLE)
            .count()
            == 1
        {
            self.finalize_hand()?;
        } else if self.players.need_bets_from.is_empty() {
            while self.players.need_bets_from.is_empty() && !matches!(self.state(), State::Showdown)
            {
                let next_state = self.advance_street()?;
                self.change_state(next_state);
            }
            if matches!(self.state(), State::Showdown) {
                self.finalize_hand()?;
            }
        }
        if !self.players.need_bets_from.is_empty() {
            self.logs.push(LogItem::NextToAct(self.nta().unwrap().0));
        }
        Ok(())
    }

    fn change_state(&mut self, new: State) {
        self.logs
            .push(LogItem::StateChange(self.__state_dont_change_directly, new));
        // this is the only place the state should ever be changed directly
        self.__state_dont_change_directly = new;
    }

    fn set_current_bet(&mut self, new_cb: Currency, new_mr: Currency) {
        let old_cb = self.__current_bet_dont_change_directly;
        let old_mr = self.__min_raise_dont_change_directly;
        self.logs
            .push(LogItem::CurrentBetSet(old_cb, new_cb, old_mr, new_mr));
        // this is the only place these should ever be changed directly
        self.__current_bet_dont_change_directly = new_cb;
        self.__min_raise_dont_change_directly = new_mr;
    }

    pub const fn state(&self) -> State {
        self.__state_dont_change_directly
    }

    pub const fn current_bet(&self) -> Currency {
        self.__current_bet_dont_change_directly
    }

    pub const fn min_raise(&self) -> Currency {
        self.__min_raise_dont_change_directly
    }

    fn advance_street(&mut self) -> Result<State, GameError> {
        let next = match self.state() {
            State::Street(round) => match round {
                Street::PreFlop => State::Street(Street::Flop),
                Street::Flop => State::Street(Street::Turn),
                Street::Turn => State::Street(Street::River),
                Street::River => State::Showdown,
            },
            _ => unreachable!(),
        };
        self.players.next_street()?;
        self.pot.finalize_round();
        self.set_current_bet(Currency::ZERO, self.big_blind);
        self.last_raiser = None;
        if let State::Street(street) = next {
            match street {
                Street::PreFlop => unreachable!(),
                Street::Flop => {
                    self.deck.burn();
                    let c1 = self.deck.draw()?;
                    let c2 = self.deck.draw()?;
                    let c3 = self.deck.draw()?;
                    self.community[0] = Some(c1);
                    self.community[1] = Some(c2);
                    self.community[2] = Some(c3);
                    self.logs.push(LogItem::Flop(c1, c2, c3));
                }
                Street::Turn => {
                    self.deck.burn();
                    let c1 = self.deck.draw()?;
                    self.community[3] = Some(c1);
                    self.logs.push(LogItem::Turn(c1));
                }
                Street::River => {
                    self.deck.burn();
                    let c1 = self.deck.draw()?;
                    self.community[4] = Some(c1);
                    self.logs.push(LogItem::River(c1));
                }
            }
        }
        Ok(next)
    }

    pub fn try_sit(&mut self, player_id: PlayerId, stack: Currency) -> Result<(), GameError> {
        if self.players.player_by_id(player_id).is_some() {
            return Err(GameError::PlayerAlreadySeated);
        }
        let p = Player::new(player_id, stack);
        self.players.seat_player(p)?;
        Ok(())
    }

    /// Seat a player at a specific, client-chosen seat index rather than the next free one.
    pub fn try_sit_at(
        &mut self,
        seat_idx: SeatIdx,
        player_id: PlayerId,
        stack: Currency,
    ) -> Result<(), GameError> {
        if self.players.player_by_id(player_id).is_some() {
            return Err(GameError::PlayerAlreadySeated);
        }
        let p = Player::new(player_id, stack);
        self.players.seat_player_at(seat_idx, p)
    }

    /// If we are able to automatically move the current hand forward, do so.
    pub fn tick(&mut self) -> Result<(), GameError> {
        if matches!(self.state(), State::NotStarted)
            && self.players.players_iter(PlayerFilter::MAY_BET).count() > 1
        {
            return self.start_hand();
        }
        if matches!(self.state(), State::EndOfHand) {
            return self.start_hand();
        }
        Ok(())
    }

    fn finalize_hand(&mut self) -> Result<(), GameError> {
        let pot = std::mem::take(&mut self.pot);
        // Pot-eligible players still in for this hand.
        let players: Vec<PlayerId> = self
            .players
            .players_iter(PlayerFilter::POT_ELIGIBLE)
            .map(|(_, p)| p.id)
            .collect();
        // PlayerIds, sorted in a Vec<Vec<PlayerId>>, for pot's payout function. Nobody's hand is
        // evaluated unless there's an actual showdown between two or more players.
        let ranked_players = if players.len() == 1 {
            vec![vec![players[0]]]
        } else {
            assert!(self.community[4].is_some());
            let pockets = self
                .players
                .players_iter(PlayerFilter::POT_ELIGIBLE)
                .map(|(_, p)| (p.id, p.pocket.expect("pot-eligible player has no pocket")))
                .collect();
            let community = [
                self.community[0].unwrap(),
                self.community[1].unwrap(),
                self.community[2].unwrap(),
                self.community[3].unwrap(),
                self.community[4].unwrap(),
            ];
            best_hands(&pockets, community)?
                .iter()
                .map(|inner| inner.iter().map(|item| item.0).collect())
                .collect()
        };
        let (winnings, per_pot, pot_logs) = pot.payout_with_log(&ranked_players);
        self.last_hand_payouts = per_pot
            .into_iter()
            .map(|(pot_id, hm)| {
                let mut winners: Vec<(PlayerId, Currency)> = hm.into_iter().collect();
                winners.sort_unstable_by_key(|(pid, _)| *pid);
                (pot_id, winners)
            })
            .collect();
        // A hand needs to be revealed if more than one player could win the pot at this time.
        if players.len() > 1 {
            for winning_player_id in winnings.keys() {
                let p = self
                    .players
                    .player_by_id(*winning_player_id)
                    .expect("unable to get player that allegedly won (at least part of) the pot");
                let cards = p
                    .pocket
                    .expect("player that won (at least part of) the pot has no cards");
                let li = LogItem::HandReveal(*winning_player_id, [Some(cards[0]), Some(cards[1])]);
                self.logs.push(li);
            }
        }
        self.players.end_hand(&winnings)?;
        self.change_state(State::EndOfHand);
        self.logs.extend(pot_logs.into_iter().map(|pli| pli.into()));
        Ok(())
    }

    fn clean_state(&mut self, deck_seed: DeckSeed) {
        self.logs.rotate();
        self.players.clean_state();
        let bs = Box::new(self.into());
        self.logs.push(LogItem::NewHandSnapshot(bs));
        self.change_state(State::NotStarted);
        self.community = [None; COMMUNITY_SIZE];
        self.pot = Default::default();
        self.deck = Deck::new(&deck_seed);
        self.set_current_bet(Currency::ZERO, self.big_blind);
        self.last_raiser = None;
    }

    pub fn start_hand(&mut self) -> Result<(), GameError> {
        let seed = DeckSeed::default();
        self.start_hand_with_seed(seed)
    }

    pub fn start_hand_with_seed(&mut self, seed: DeckSeed) -> Result<(), GameError> {
        self.clean_state(seed);
        self.players.start_hand()?;
        self.change_state(State::Street(Street::PreFlop));
        self.logs.push(LogItem::TokensSet(
            self.players.token_dealer,
            self.players.token_sb,
            self.players.token_bb,
        ));
        self.set_current_bet(Currency::ZERO, self.big_blind);
        let ((player_sb, bet_sb), (player_bb, bet_bb)) = self.blinds_bet()?;
        self.pot.bet(player_sb, bet_sb);
        self.pot.bet(player_bb, bet_bb);
        self.set_current_bet(self.big_blind, self.big_blind * 2);
        // At this point there is no last raiser, but `bet()` considers the BB to have taken the
        // most recent aggressive action. We clear it so the BB isn't barred from raising if no
        // one raises before them.
        assert!(self.last_raiser.is_some());
        assert_eq!(
            self.last_raiser.unwrap(),
            self.players.players[self.players.token_bb].unwrap().id,
        );
        self.last_raiser = None;

        let num_p = self.players.players_iter(PlayerFilter::MAY_BET).count() as u8;
        let pockets = self.deck.deal_pockets(num_p)?;
        let deal_logs = self
            .players
            .deal_pockets(pockets)
            .into_iter()
            .map(|(k, v)| LogItem::PocketDealt(k, v));
        self.logs.extend(deal_logs);
        self.logs.push(LogItem::NextToAct(self.nta().unwrap().0));
        Ok(())
    }

    /// Have the SB and BB execute their obligatory preflop betting. Return their IDs and bet
    /// amounts.
    ///
    /// Caller can't assume SB and BB are in for the full SB/BB amount: a short stack could be
    /// all in for less.
    fn blinds_bet(&mut self) -> Result<(PidBA, PidBA), GameError> {
        let player_sb =
            self.players.players[self.players.token_sb].ok_or(GameError::PlayerNotFound)?;
        let player_bb =
            self.players.players[self.players.token_bb].ok_or(GameError::PlayerNotFound)?;
        let bet_sb = self.bet(player_sb.id, BetAction::Bet(self.small_blind))?;
        let bet_bb = self.bet(player_bb.id, BetAction::Bet(self.big_blind))?;
        // the blinds have bet, and they need the opportunity to bet again this round, so rebuild
        // need_bets_from
        self.players.need_bets_from = self
            .players
            .betting_players_iter_after(self.players.token_bb)
            .map(|(i, _)| i)
            .take(self.players.players_iter(PlayerFilter::MAY_BET).count())
            .collect();
        self.players.need_bets_from.reverse();
        Ok(((player_sb.id, bet_sb), (player_bb.id, bet_bb)))
    }

    /// Check that the player can make the given bet, adjusting it if possible. Returns the
    /// (possibly adjusted) bet this player made.
    fn bet(&mut self, player_id: PlayerId, bet: BetAction) -> Result<BetAction, GameError> {
        if !matches!(self.state(), State::Street(_)) {
            return Err(GameError::GameNotRunning);
        }
        match &bet {
            BetAction::Check | BetAction::Fold => {}
            BetAction::AllIn(_) => {}
            BetAction::Bet(x) | BetAction::Call(x) => match x.cmp(&self.current_bet()) {
                Ordering::Less => return Err(GameError::InvalidBet),
                Ordering::Greater => {
                    // only an error if the current bet is non-zero; it's zero at the start of
                    // post-flop rounds
                    if self.current_bet() != Currency::ZERO {
                        return Err(GameError::InvalidBet);
                    }
                }
                Ordering::Equal => {}
            },
            BetAction::Raise(x) => {
                if x < &self.min_raise() {
                    return Err(GameError::InvalidBet);
                }
                if self.last_raiser.is_some() && self.last_raiser.unwrap() == player_id {
                    return Err(GameError::InvalidBet);
                }
            }
        }
        let seat = {
            let (seat, p) = self
                .players
                .player_with_index_by_id(player_id)
                .ok_or(GameError::PlayerNotFound)?;
            if !p.is_betting() {
                return Err(GameError::PlayerIsNotBetting);
            } else if self.players.need_bets_from.is_empty() {
                return Err(GameError::NoBetExpected);
            } else if self.players.need_bets_from[self.players.need_bets_from.len() - 1] != seat {
                // the next player we expect a bet from is the last item in the list
                return Err(GameError::NotYourTurn);
            }
            seat
        };
        let should_update_last_raiser = match &bet {
            BetAction::Check | BetAction::Fold => false,
            BetAction::Call(x) | BetAction::Bet(x) | BetAction::Raise(x) | BetAction::AllIn(x) => {
                *x >= self.min_raise()
            }
        };

        let bet = self
            .players
            .player_by_id_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?
            .bet(bet)?;

        match bet {
            BetAction::Check | BetAction::Fold => {
                self.players.need_bets_from.pop();
            }
            BetAction::Call(x) | BetAction::Bet(x) | BetAction::Raise(x) | BetAction::AllIn(x) => {
                match x.cmp(&self.current_bet()) {
                    std::cmp::Ordering::Less => {
                        if bet.is_allin() {
                            self.players.need_bets_from.pop();
                        } else {
                            return Err(GameError::InvalidBet);
                        }
                    }
                    std::cmp::Ordering::Equal => {
                        self.players.need_bets_from.pop();
                    }
                    std::cmp::Ordering::Greater => {
                        let n = if bet.is_allin()
                            && self.players.players_iter(PlayerFilter::MAY_BET).count() == 0
                        {
                            0
                        } else if bet.is_allin() {
                            self.players.players_iter(PlayerFilter::MAY_BET).count()
                        } else {
                            self.players.players_iter(PlayerFilter::MAY_BET).count() - 1
                        };
                        self.players.need_bets_from = self
                            .players
                            .betting_players_iter_after(seat)
                            .map(|(i, _)| i)
                            .take(n)
                            .collect();
                        self.players.need_bets_from.reverse();
                    }
                }
            }
        }

        if should_update_last_raiser {
            self.last_raiser = Some(player_id);
            self.players.reset_has_acted_for_raise(player_id);
        }
        Ok(bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::BetStatus;
    use crate::player::Player;
    use crate::MAX_PLAYERS;

    #[test]
    fn all_in_on_blind() {
        let mut gs = GameState::default();
        gs.players.players[0] = Some(Player::new(1, 2.into()));
        gs.players.players[5] = Some(Player::new(2, 10.into()));
        gs.start_hand().unwrap();
        assert_eq!(
            gs.players.player_by_id(1).unwrap().bet_status,
            BetStatus::AllIn(2.into())
        );
        assert_eq!(
            gs.players.player_by_id(2).unwrap().bet_status,
            BetStatus::In(DEF_SB)
        );
    }

    #[test]
    fn player_cant_sit_twice() {
        let mut gs = GameState::default();
        gs.try_sit(1, 10.into()).unwrap();
        let r = gs.try_sit(1, 123.into());
        assert!(r.is_err());
    }

    /// `deal_pockets` doesn't panic, e.g. by trying to deal more pockets than given (giving the
    /// same person two pockets).
    #[test]
    fn deal_pockets() {
        for n_players in 2..=MAX_PLAYERS {
            for first in 0..n_players {
                let mut gs = GameState::default();
                for seat in 0..n_players {
                    gs.try_sit(seat as PlayerId, 10000.into()).unwrap();
                }
                while gs.players.token_dealer != first as SeatIdx {
                    gs.players.start_hand().unwrap();
                }
                let mut deck = Deck::default();
                let pockets = deck.deal_pockets(n_players as u8);
                gs.players.deal_pockets(pockets);
                for (_, player) in gs.players.players_iter(PlayerFilter::ALL) {
                    assert!(player.pocket.is_some());
                }
            }
        }
    }

    /// When action folds to the SB and the SB just completes, the BB is allowed to raise.
    #[test]
    fn bigblind_can_raise() {
        let mut gs = GameState::default();
        let stack: Currency = DEF_BB * 10;
        const SB_PID: PlayerId = 1;
        const BB_PID: PlayerId = 2;
        gs.try_sit(BB_PID, stack).unwrap();
        gs.try_sit(SB_PID, stack).unwrap();
        gs.start_hand().unwrap();
        const SB_SEAT: SeatIdx = 1;
        const BB_SEAT: SeatIdx = 0;
        assert_eq!(gs.players.token_dealer, SB_SEAT);
        assert_eq!(gs.players.token_sb, SB_SEAT);
        assert_eq!(gs.players.token_bb, BB_SEAT);
        assert_eq!(gs.nta().unwrap().0, SB_SEAT);
        gs.player_calls(SB_PID).unwrap();
        assert_eq!(gs.nta().unwrap().0, BB_SEAT);
        gs.player_raises(BB_PID, DEF_BB * 3).unwrap();
    }

    /// S1 from the testable-properties scenarios: basic two-player hand ending on a fold.
    #[test]
    fn basic_two_player_hand_ends_on_fold() {
        let mut gs = GameState::with_blinds(5.into(), 10.into());
        const P1: PlayerId = 1;
        const P2: PlayerId = 2;
        gs.try_sit(P1, 1000.into()).unwrap();
        gs.try_sit(P2, 1000.into()).unwrap();
        gs.start_hand().unwrap();
        // heads up: dealer/SB acts first preflop
        gs.player_calls(P1).unwrap();
        gs.player_checks(P2).unwrap();
        assert!(matches!(gs.state(), State::Street(Street::Flop)));
        gs.player_checks(P1).unwrap();
        gs.player_bets(P2, 20.into()).unwrap();
        gs.player_folds(P1).unwrap();
        assert!(matches!(gs.state(), State::EndOfHand));
        assert_eq!(gs.players.player_by_id(P1).unwrap().stack, 990.into());
        assert_eq!(gs.players.player_by_id(P2).unwrap().stack, 1010.into());
    }
}
