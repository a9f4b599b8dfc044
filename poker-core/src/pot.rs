//! Main and side pots for a single hand.
//!
//! `Pot` only tracks monetary commitments. It does no validation of its own —
//! the hand engine is responsible for only ever calling `bet()` with amounts
//! that are legal given the current betting round. Side pots are derived
//! automatically at `finalize_round()` whenever one or more players are
//! all in for less than another player's stake.
use crate::bet::BetAction;
use crate::currency::Currency;
use crate::PlayerId;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Index of a settled side pot within a hand, in creation order. Pot 0 is
/// always the main pot.
pub type PotId = u16;

fn merge_hashmap(into: &mut HashMap<PlayerId, Currency>, from: HashMap<PlayerId, Currency>) {
    for (player, amount) in from {
        *into.entry(player).or_insert(Currency::ZERO) += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogItem {
    Bet(PlayerId, BetAction),
    RoundEnd(usize),
    BetsSorted(Vec<(PlayerId, Stake)>),
    EntireStakeInPot(PotId, PlayerId, Stake),
    PartialStakeInPot(PotId, PlayerId, Stake, Currency),
    NewPotCreated(PotId, PlayerId, Stake),
    Payouts(Option<PotId>, HashMap<PlayerId, Currency>),
}

impl std::fmt::Display for LogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LogItem::Bet(player, bet) => write!(f, "Player {} makes bet {}", player, bet),
            LogItem::RoundEnd(settled_n) => write!(
                f,
                "The betting round has ended. There are {} settled pots",
                settled_n
            ),
            LogItem::BetsSorted(bets) => {
                let middle: String = bets
                    .iter()
                    .map(|(player, stake)| format!("p{}: {}", player, stake))
                    .join(", ");
                write!(f, "Betting round is ending. Bets are sorted: [{}]", middle)
            }
            LogItem::EntireStakeInPot(pot_n, player, stake) => write!(
                f,
                "Player {}'s bet {} entirely allocated to pot {}",
                player, stake, pot_n
            ),
            LogItem::PartialStakeInPot(pot_n, player, stake, max_in) => write!(
                f,
                "{} of Player {}'s bet {} allocated to pot {}",
                max_in, player, stake, pot_n
            ),
            LogItem::NewPotCreated(pot_n, player, stake) => write!(
                f,
                "Player {}'s bet {} allocated to new pot {}",
                player, stake, pot_n
            ),
            LogItem::Payouts(pot_n, payouts) => {
                let middle: String = payouts
                    .iter()
                    .map(|(player, amount)| format!("p{}: {}", player, amount))
                    .join(", ");
                let prefix = match pot_n {
                    None => "Total".to_string(),
                    Some(pot_n) => format!("Settled pot {}", pot_n),
                };
                write!(f, "{} payouts: [{}]", prefix, middle)
            }
        }
    }
}

/// Binds an `is_allin` flag to a bet amount: pot logic needs to know whether
/// a stake represents a player's entire remaining commitment to cap the pot
/// correctly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    is_allin: bool,
    amount: Currency,
}

impl std::fmt::Display for Stake {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "({}{})",
            self.amount,
            if self.is_allin { " allin" } else { "" }
        )
    }
}

impl From<(bool, Currency)> for Stake {
    fn from(tup: (bool, Currency)) -> Self {
        Self {
            is_allin: tup.0,
            amount: tup.1,
        }
    }
}

/// Divide `x` as evenly as possible `y` ways using only positive ints.
///
/// `split_x_by_y(5, 3)` returns `[2, 2, 1]`. The remainder cents are awarded
/// in descending order to the callers' list of winners; the hand engine
/// passes winners to `InnerPot::payout` ordered starting from the seat
/// immediately clockwise of the dealer, so the odd chip lands on the closest
/// eligible player to the dealer's left, per standard cardroom convention.
///
/// # Panics
///
/// Panics if given non-positive numbers. There should never be a negative
/// payout or a non-positive number of winners.
fn split_x_by_y(x: i64, y: i64) -> Vec<i64> {
    assert!(y.is_positive());
    assert!(x.is_positive());
    let mut ret = Vec::with_capacity(y as usize);
    let mut frac_accum = 0;
    for i in 0..y {
        frac_accum += x % y;
        if frac_accum >= y || i == y - 1 && frac_accum > 0 {
            ret.push((x / y) + 1);
        } else {
            ret.push(x / y);
        }
        if frac_accum >= y {
            frac_accum -= y;
        }
    }
    ret
}

/// Main and side pots for a single hand.
///
/// Feed every player's **total** commitment for the round into `bet()`, call
/// `finalize_round()` between streets to settle side pots, and call
/// `payout()` once at showdown (or on an uncontested fold-win) with players
/// ranked best-hand-first.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    /// Pots from previous betting rounds. Immutable once created.
    settled: Vec<InnerPot>,
    /// The current round's unsettled bets, keyed by player.
    working: HashMap<PlayerId, Stake>,
    /// Every action taken, for the hand's audit log.
    log: Vec<LogItem>,
}

/// A pool of money a specific subset of players is eligible to win. New
/// `InnerPot`s are created every betting round, and extra ones are created
/// mid-round when players go all in for different amounts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct InnerPot {
    players: HashMap<PlayerId, Stake>,
    /// Non-`None` once an all-in player has set a ceiling on this pot.
    max_in: Option<Currency>,
}

impl InnerPot {
    /// `ranked_players` is ordered best-hand-group first; each inner `Vec` is
    /// a tie. Returns this pot split across whichever group is the first to
    /// contain a player eligible for it.
    fn payout(self, ranked_players: &[Vec<PlayerId>]) -> HashMap<PlayerId, Currency> {
        let mut hm: HashMap<PlayerId, Currency> = HashMap::new();
        for player_group in ranked_players {
            let winning_players: Vec<_> = player_group
                .iter()
                .filter(|&&p| self.players.contains_key(&p))
                .collect();
            if winning_players.is_empty() {
                continue;
            }
            let payouts = split_x_by_y(self.value().cents(), winning_players.len() as i64);
            for (player, payout) in itertools::zip(winning_players, payouts) {
                hm.insert(*player, Currency::from_cents(payout));
            }
            break;
        }
        hm
    }

    fn value(&self) -> Currency {
        self.players.values().copied().map(|s| s.amount).sum()
    }
}

impl Pot {
    /// Mark the current betting round as over, folding the working bets into
    /// one or more settled `InnerPot`s. Side pots appear automatically
    /// whenever one or more players went all in for less than the rest.
    pub fn finalize_round(&mut self) {
        let mut pots: Vec<InnerPot> = vec![];
        // All-in players first, smallest all-in first, so the pot ceiling is
        // established before anyone who bet more arrives.
        let iter: Vec<_> = self
            .working
            .drain()
            .sorted_unstable_by(|l, r| match (l.1.is_allin, r.1.is_allin) {
                (true, true) => l.1.amount.cmp(&r.1.amount),
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => Ordering::Equal,
            })
            .collect();
        self.log.push(LogItem::BetsSorted(iter.clone()));
        for (player, mut stake) in iter {
            for (pot_n, pot) in pots.iter_mut().enumerate() {
                match pot.max_in {
                    None => {
                        self.log
                            .push(LogItem::EntireStakeInPot(pot_n as PotId, player, stake));
                        pot.players.insert(player, stake);
                        stake.amount = Currency::ZERO;
                        break;
                    }
                    Some(max_in) => match stake.amount.cmp(&max_in) {
                        Ordering::Less | Ordering::Equal => {
                            self.log
                                .push(LogItem::EntireStakeInPot(pot_n as PotId, player, stake));
                            pot.players.insert(player, stake);
                            stake.amount = Currency::ZERO;
                            break;
                        }
                        Ordering::Greater => {
                            self.log.push(LogItem::PartialStakeInPot(
                                pot_n as PotId,
                                player,
                                stake,
                                max_in,
                            ));
                            pot.players.insert(player, (stake.is_allin, max_in).into());
                            stake.amount -= max_in;
                        }
                    },
                }
            }
            if stake.amount > Currency::ZERO {
                let mut new = InnerPot {
                    max_in: stake.is_allin.then_some(stake.amount),
                    ..Default::default()
                };
                new.players.insert(player, stake);
                pots.push(new);
                self.log.push(LogItem::NewPotCreated(
                    (pots.len() - 1) as PotId,
                    player,
                    stake,
                ));
            }
        }
        self.settled.append(&mut pots);
        self.log.push(LogItem::RoundEnd(self.settled.len()));
    }

    fn settled_value(&self) -> Currency {
        self.settled.iter().map(InnerPot::value).sum()
    }

    /// Total of every settled and unsettled (working) bet in the pot.
    pub fn total_value(&self) -> Currency {
        self.settled_value() + self.working.values().copied().map(|s| s.amount).sum()
    }

    /// A read-only snapshot per settled pot, for the client-facing game view:
    /// `(pot id, amount, eligible player ids)`.
    pub fn settled_snapshot(&self) -> Vec<(PotId, Currency, Vec<PlayerId>)> {
        self.settled
            .iter()
            .enumerate()
            .map(|(i, ip)| {
                let mut players: Vec<PlayerId> = ip.players.keys().copied().collect();
                players.sort_unstable();
                (i as PotId, ip.value(), players)
            })
            .collect()
    }

    /// Consumes the pot, paying out every settled `InnerPot`.
    ///
    /// `ranked_players` is the showdown ordering from `best_hands`, or
    /// `[[winner]]` for an uncontested fold win. Folded players must not
    /// appear anywhere in it.
    pub fn payout(self, ranked_players: &[Vec<PlayerId>]) -> HashMap<PlayerId, Currency> {
        let (hm, _, _) = self.payout_with_log(ranked_players);
        hm
    }

    /// Pays out every settled pot, returning the merged total per player, the same breakdown
    /// per settled pot (so callers can tell which pot each winner actually won), and the audit
    /// log of how it happened.
    pub fn payout_with_log(
        mut self,
        ranked_players: &[Vec<PlayerId>],
    ) -> (
        HashMap<PlayerId, Currency>,
        Vec<(PotId, HashMap<PlayerId, Currency>)>,
        Vec<LogItem>,
    ) {
        if !self.working.is_empty() {
            self.finalize_round();
        }
        assert!(self.working.is_empty());

        let mut hm: HashMap<PlayerId, Currency> = HashMap::new();
        let mut per_pot = Vec::with_capacity(self.settled.len());
        for (pot_n, pot) in self.settled.into_iter().enumerate() {
            let hm_n = pot.payout(ranked_players);
            self.log
                .push(LogItem::Payouts(Some(pot_n as PotId), hm_n.clone()));
            merge_hashmap(&mut hm, hm_n.clone());
            per_pot.push((pot_n as PotId, hm_n));
        }
        self.log.push(LogItem::Payouts(None, hm.clone()));
        (hm, per_pot, self.log)
    }

    /// Record a player's total commitment for the current round. If in one
    /// round a player bets 10 then calls a raise to 30, pass `Call(30)`, not
    /// `Call(20)`.
    pub fn bet(&mut self, player: PlayerId, action: BetAction) {
        self.log.push(LogItem::Bet(player, action));
        let stake: Stake = match action {
            BetAction::Check | BetAction::Fold => return,
            BetAction::Call(v) | BetAction::Bet(v) | BetAction::Raise(v) => (false, v),
            BetAction::AllIn(v) => (true, v),
        }
        .into();
        self.working.insert(player, stake);
    }
}

#[cfg(test)]
mod test_payout {
    use super::*;

    #[test]
    fn simple_single_winner() {
        let mut p = Pot::default();
        p.bet(1, BetAction::Bet(5.into()));
        p.bet(2, BetAction::Call(5.into()));
        p.bet(3, BetAction::Call(5.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![1]]);
        assert_eq!(payout[&1], 15.into());
    }

    #[test]
    fn simple_multi_winner() {
        let mut p = Pot::default();
        p.bet(1, BetAction::Bet(5.into()));
        p.bet(2, BetAction::Call(5.into()));
        p.bet(3, BetAction::Call(5.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![1, 2]]);
        assert_eq!(payout[&1], 8.into());
        assert_eq!(payout[&2], 7.into());
    }

    #[test]
    fn three_way_tie() {
        let mut p = Pot::default();
        p.bet(1, BetAction::Bet(5.into()));
        p.bet(2, BetAction::Bet(5.into()));
        p.bet(3, BetAction::Bet(5.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![1, 2, 3]]);
        assert_eq!(payout[&1], 5.into());
        assert_eq!(payout[&2], 5.into());
        assert_eq!(payout[&3], 5.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_in_blind() {
        let mut p = Pot::default();
        p.bet(1, BetAction::AllIn(5.into()));
        p.bet(2, BetAction::Bet(10.into()));
        p.bet(3, BetAction::AllIn(8.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![1], vec![2, 3]]);
        assert_eq!(payout[&1], 15.into());
        assert_eq!(payout[&2], 5.into());
        assert_eq!(payout[&3], 3.into());
    }

    #[test]
    fn side_pot_payout() {
        let mut p = Pot::default();
        p.bet(1, BetAction::Bet(10.into()));
        p.bet(2, BetAction::AllIn(5.into()));
        p.bet(3, BetAction::Bet(10.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![2], vec![1, 3]]);
        assert_eq!(payout[&2], 15.into());
        assert_eq!(payout[&1], 5.into());
        assert_eq!(payout[&3], 5.into());
    }

    #[test]
    fn overflowing_side_pot() {
        let mut p = Pot::default();
        p.bet(1, BetAction::Bet(10.into()));
        p.bet(2, BetAction::AllIn(5.into()));
        p.bet(3, BetAction::AllIn(3.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![3], vec![2], vec![1]]);
        assert_eq!(payout[&3], 9.into());
        assert_eq!(payout[&2], 4.into());
        assert_eq!(payout[&1], 5.into());
    }

    #[test]
    fn multi_round_pot() {
        let mut p = Pot::default();
        p.bet(1, BetAction::Bet(5.into()));
        p.bet(2, BetAction::Call(5.into()));
        p.bet(3, BetAction::Call(5.into()));
        p.finalize_round();
        p.bet(1, BetAction::Bet(5.into()));
        p.bet(2, BetAction::Bet(10.into()));
        p.bet(3, BetAction::AllIn(8.into()));
        p.bet(1, BetAction::Call(10.into()));
        p.finalize_round();
        p.bet(1, BetAction::Bet(10.into()));
        p.bet(2, BetAction::AllIn(6.into()));
        p.finalize_round();
        let payout = p.payout(&[vec![3], vec![2], vec![1]]);
        assert_eq!(payout[&3], 39.into());
        assert_eq!(payout[&2], 16.into());
        assert_eq!(payout[&1], 4.into());
    }

    #[test]
    fn bet_call_raise_are_equivalent() {
        fn helper(p: Pot) {
            let payout = p.payout(&[vec![1]]);
            assert_eq!(payout[&1], 15.into());
        }
        let mut p1 = Pot::default();
        p1.bet(1, BetAction::Bet(5.into()));
        p1.bet(2, BetAction::Bet(5.into()));
        p1.bet(3, BetAction::Bet(5.into()));
        p1.finalize_round();
        helper(p1);

        let mut p2 = Pot::default();
        p2.bet(1, BetAction::Call(5.into()));
        p2.bet(2, BetAction::Call(5.into()));
        p2.bet(3, BetAction::Call(5.into()));
        p2.finalize_round();
        helper(p2);

        let mut p3 = Pot::default();
        p3.bet(1, BetAction::Raise(5.into()));
        p3.bet(2, BetAction::Raise(5.into()));
        p3.bet(3, BetAction::Raise(5.into()));
        p3.finalize_round();
        helper(p3);
    }

    #[test]
    fn all_all_in() {
        let mut p = Pot::default();
        p.bet(1, BetAction::AllIn(5.into()));
        p.bet(2, BetAction::AllIn(15.into()));
        p.bet(3, BetAction::AllIn(45.into()));
        p.finalize_round();
        assert_eq!(p.settled.len(), 3);
        assert_eq!(p.settled[0].players.len(), 3);
        assert_eq!(p.settled[0].max_in, Some(5.into()));
        assert_eq!(p.settled[1].players.len(), 2);
        assert_eq!(p.settled[1].max_in, Some(10.into()));
        assert_eq!(p.settled[2].players.len(), 1);
        assert_eq!(p.settled[2].max_in, Some(30.into()));
    }
}

#[cfg(test)]
mod test_split_x_by_y {
    use super::split_x_by_y;

    #[test]
    fn test1() {
        assert_eq!(split_x_by_y(5, 3), vec![2, 2, 1]);
    }

    #[test]
    fn test2() {
        assert_eq!(split_x_by_y(6, 2), vec![3, 3]);
    }

    #[test]
    fn test3() {
        assert_eq!(split_x_by_y(8, 5), vec![2, 2, 2, 1, 1]);
    }
}
