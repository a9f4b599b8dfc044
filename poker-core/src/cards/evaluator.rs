//! Five-card hand ranking. Nothing here knows about seats, pots or betting —
//! it is a pure function from cards to a comparable `Hand`, called once per
//! showdown by the hand engine to decide who wins each pot.
//!
//! `HandClass` derives `Ord` in weakest-to-strongest order, so the stronger
//! hand is the *greater* one; callers pick a winner with `Iterator::max`-style
//! comparisons rather than treating a smaller value as the winner.
use super::card::{Card, Rank};
use itertools::{zip, Itertools};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, PartialEq)]
pub enum WinState {
    Win,
    Tie,
    Lose,
}

impl From<Ordering> for WinState {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => WinState::Lose,
            Ordering::Greater => WinState::Win,
            Ordering::Equal => WinState::Tie,
        }
    }
}

impl From<WinState> for Ordering {
    fn from(ws: WinState) -> Self {
        match ws {
            WinState::Lose => Ordering::Less,
            WinState::Win => Ordering::Greater,
            WinState::Tie => Ordering::Equal,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Hand {
    cards: [Card; 5],
    class: HandClass,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandClass {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandClass {
    fn beats(c1: &[Card], c2: &[Card]) -> WinState {
        let hc1 = HandClass::which(c1);
        let hc2 = HandClass::which(c2);
        match hc1.cmp(&hc2) {
            Ordering::Equal => {}
            o => return o.into(),
        };
        assert_eq!(hc1, hc2);
        let mut left: [Rank; 5] = [c1[0].rank, c1[1].rank, c1[2].rank, c1[3].rank, c1[4].rank];
        let mut right: [Rank; 5] = [c2[0].rank, c2[1].rank, c2[2].rank, c2[3].rank, c2[4].rank];
        left.sort_unstable();
        left.reverse();
        right.sort_unstable();
        right.reverse();
        match hc1 {
            HandClass::StraightFlush => HandClass::beats_straight_flush(left, right),
            HandClass::FourOfAKind => HandClass::beats_quads(left, right),
            HandClass::FullHouse => HandClass::beats_full_house(left, right),
            HandClass::Flush => HandClass::beats_flush(left, right),
            HandClass::Straight => HandClass::beats_straight(left, right),
            HandClass::ThreeOfAKind => HandClass::beats_set(left, right),
            HandClass::TwoPair => HandClass::beats_two_pair(left, right),
            HandClass::Pair => HandClass::beats_pair(left, right),
            HandClass::HighCard => HandClass::beats_high_card(left, right),
        }
        .into()
    }

    fn beats_straight_flush(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        // flush part is equal; only need to compare the straight part
        Self::beats_straight(left, right)
    }

    fn beats_quads(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        // the quads will either be 0-3 or 1-4, and kicker the remainder
        let (quad1, kick1) = if left[0] == left[3] {
            (left[0], left[4])
        } else {
            (left[4], left[0])
        };
        let (quad2, kick2) = if right[0] == right[3] {
            (right[0], right[4])
        } else {
            (right[4], right[0])
        };
        match quad1.cmp(&quad2) {
            Ordering::Equal => kick1.cmp(&kick2),
            o => o,
        }
    }

    fn beats_full_house(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        // the logic is the same as for beats_set(), except both "kickers" in a hand are the same
        Self::beats_set(left, right)
    }

    fn beats_flush(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        Self::beats_high_card(left, right)
    }

    fn beats_straight(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        // have to look special at 5432A straight, as it will be A5432 since cards are sorted by
        // rank.
        let l = match (left[0], left[1]) {
            (Rank::Ace, Rank::Five) => Rank::Five,
            (first, _) => first,
        };
        let r = match (right[0], right[1]) {
            (Rank::Ace, Rank::Five) => Rank::Five,
            (first, _) => first,
        };
        l.cmp(&r)
    }

    fn beats_set(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        // the set is either 0-2, 1-3, or 2-4. The kickers are the remainder
        let (trio1, kick1) = if left[0] == left[2] {
            (left[0], (left[3], left[4]))
        } else if left[1] == left[3] {
            (left[1], (left[0], left[4]))
        } else {
            (left[2], (left[0], left[1]))
        };
        let (trio2, kick2) = if right[0] == right[2] {
            (right[0], (right[3], right[4]))
        } else if right[1] == right[3] {
            (right[1], (right[0], right[4]))
        } else {
            (right[2], (right[0], right[1]))
        };
        match trio1.cmp(&trio2) {
            Ordering::Equal => match kick1.0.cmp(&kick2.0) {
                Ordering::Equal => kick1.1.cmp(&kick2.1),
                o => o,
            },
            o => o,
        }
    }

    fn beats_two_pair(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        // find the two pairs by finding the odd ball card instead.
        // If it's 0th, then 1-2 and 3-4 are the pairs.
        // if it's 4th, then 0-1 and 2-3 are the pairs.
        // If it's 2nd, then 0-1 and 3-4 are the pairs.
        let (pairs1, kick1) = if left[0] != left[1] {
            ((left[1], left[3]), left[0])
        } else if left[4] != left[3] {
            ((left[0], left[2]), left[4])
        } else {
            ((left[0], left[3]), left[2])
        };
        let (pairs2, kick2) = if right[0] != right[1] {
            ((right[1], right[3]), right[0])
        } else if right[4] != right[3] {
            ((right[0], right[2]), right[4])
        } else {
            ((right[0], right[3]), right[2])
        };
        match pairs1.0.cmp(&pairs2.0) {
            Ordering::Equal => match pairs1.1.cmp(&pairs2.1) {
                Ordering::Equal => kick1.cmp(&kick2),
                o => o,
            },
            o => o,
        }
    }

    fn beats_pair(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        let (pair1, kick1) = if left[0] == left[1] {
            (left[0], (left[2], left[3], left[4]))
        } else if left[1] == left[2] {
            (left[1], (left[0], left[3], left[4]))
        } else if left[2] == left[3] {
            (left[2], (left[0], left[1], left[4]))
        } else {
            (left[3], (left[0], left[1], left[2]))
        };
        let (pair2, kick2) = if right[0] == right[1] {
            (right[0], (right[2], right[3], right[4]))
        } else if right[1] == right[2] {
            (right[1], (right[0], right[3], right[4]))
        } else if right[2] == right[3] {
            (right[2], (right[0], right[1], right[4]))
        } else {
            (right[3], (right[0], right[1], right[2]))
        };
        match pair1.cmp(&pair2) {
            Ordering::Equal => match kick1.0.cmp(&kick2.0) {
                Ordering::Equal => match kick1.1.cmp(&kick2.1) {
                    Ordering::Equal => kick1.2.cmp(&kick2.2),
                    o => o,
                },
                o => o,
            },
            o => o,
        }
    }

    fn beats_high_card(left: [Rank; 5], right: [Rank; 5]) -> Ordering {
        for (l, r) in zip(left.iter(), right.iter()) {
            match l.cmp(r) {
                Ordering::Equal => {}
                o => return o,
            };
        }
        Ordering::Equal
    }

    fn which(c: &[Card]) -> HandClass {
        // It's important that the order of these checks is maintained from best-hand to
        // worst-hand. The check for hand type $foo only verifies the hand can be considered $foo,
        // not that $foo is the best thing it can be considered: is_straight() doesn't check if
        // the hand is also a flush, so is_straight_flush() must be called first.
        assert_eq!(c.len(), 5);
        let mut cards: [Card; 5] = [c[0], c[1], c[2], c[3], c[4]];
        cards.sort_unstable();
        cards.reverse();
        if Self::is_straight_flush(&cards) {
            Self::StraightFlush
        } else if Self::is_quads(&cards) {
            Self::FourOfAKind
        } else if Self::is_full_house(&cards) {
            Self::FullHouse
        } else if Self::is_flush(&cards) {
            Self::Flush
        } else if Self::is_straight(&cards) {
            Self::Straight
        } else if Self::is_set(&cards) {
            Self::ThreeOfAKind
        } else if Self::is_two_pair(&cards) {
            Self::TwoPair
        } else if Self::is_pair(&cards) {
            Self::Pair
        } else {
            Self::HighCard
        }
    }

    fn is_straight_flush(cards: &[Card; 5]) -> bool {
        // requires cards to be sorted
        Self::is_straight(cards) && Self::is_flush(cards)
    }

    fn is_quads(cards: &[Card; 5]) -> bool {
        // requires cards to be sorted: the odd card out must be first or last
        cards[0].rank == cards[3].rank || cards[1].rank == cards[4].rank
    }

    fn is_full_house(cards: &[Card; 5]) -> bool {
        if cards.iter().map(|c| c.rank).unique().count() != 2 {
            return false;
        }
        // exactly two ranks: it's either quads or a full house
        !Self::is_quads(cards)
    }

    fn is_straight(cards: &[Card; 5]) -> bool {
        // requires cards to be sorted
        let ints: Vec<i8> = cards.iter().map(|c| i8::from(c.rank) - 2).collect();
        assert_eq!(ints.len(), 5);
        // A2345 straight sorts as A5432 (12, 3, 2, 1, 0), which doesn't look consecutive
        if ints == [12, 3, 2, 1, 0] {
            return true;
        }
        for n in 0..4 {
            if ints[n] - 1 != ints[n + 1] {
                return false;
            }
        }
        true
    }

    fn is_flush(cards: &[Card; 5]) -> bool {
        cards.iter().map(|c| c.suit).unique().count() == 1
    }

    fn is_set(cards: &[Card; 5]) -> bool {
        // requires cards to be sorted
        if cards.iter().map(|c| c.rank).unique().count() != 3 {
            return false;
        }
        cards[0].rank == cards[2].rank
            || cards[1].rank == cards[3].rank
            || cards[2].rank == cards[4].rank
    }

    fn is_two_pair(cards: &[Card; 5]) -> bool {
        if cards.iter().map(|c| c.rank).unique().count() != 3 {
            return false;
        }
        !Self::is_set(cards)
    }

    fn is_pair(cards: &[Card; 5]) -> bool {
        cards.iter().map(|c| c.rank).unique().count() == 4
    }
}

#[derive(PartialEq, Debug, derive_more::Display, derive_more::Error)]
pub enum HandError {
    #[display(fmt = "five cards are required, but {} were given", _0)]
    NotFiveCards(#[error(not(source))] usize),
    #[display(fmt = "two cards are required, but {} were given", _0)]
    NotTwoCards(#[error(not(source))] usize),
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.cards[0], self.cards[1], self.cards[2], self.cards[3], self.cards[4],
        )
    }
}

impl Hand {
    pub fn new(cards: &[Card]) -> Result<Self, HandError> {
        match cards.len() {
            5 => Ok(Self::new_unchecked(cards)),
            n => Err(HandError::NotFiveCards(n)),
        }
    }

    pub fn new_unchecked(c: &[Card]) -> Self {
        Self {
            cards: [c[0], c[1], c[2], c[3], c[4]],
            class: HandClass::which(c),
        }
    }

    pub fn class(&self) -> HandClass {
        self.class
    }

    pub fn beats(&self, other: &Self) -> WinState {
        match self.class.cmp(&other.class) {
            Ordering::Equal => HandClass::beats(&self.cards, &other.cards),
            o => o.into(),
        }
    }

    fn first_paired(cards: &[Card]) -> Rank {
        let mut seen = Vec::with_capacity(4);
        for c in cards {
            if seen.contains(&c.rank) {
                return c.rank;
            }
            seen.push(c.rank);
        }
        unreachable!();
    }

    fn first_paired_not(cards: &[Card], other: Rank) -> Rank {
        let mut seen = Vec::with_capacity(3);
        for c in cards {
            if c.rank == other {
                continue;
            } else if seen.contains(&c.rank) {
                return c.rank;
            }
            seen.push(c.rank);
        }
        unreachable!();
    }

    fn first_set(cards: &[Card]) -> Rank {
        let mut seen = Vec::with_capacity(3);
        let mut seen_twice = None;
        for c in cards {
            if !seen.contains(&c.rank) {
                seen.push(c.rank);
            } else if seen_twice.is_none() {
                seen_twice = Some(c.rank);
            } else if seen_twice.unwrap() == c.rank {
                return c.rank;
            }
        }
        unreachable!();
    }

    fn straight_high(c: &[Card]) -> Rank {
        let mut cards: [Card; 5] = [c[0], c[1], c[2], c[3], c[4]];
        cards.sort_unstable();
        cards.reverse();
        match cards[0].rank {
            Rank::Ace => match cards[1].rank {
                Rank::King => Rank::Ace,
                Rank::Five => Rank::Five,
                _ => unreachable!(),
            },
            _ => cards[0].rank,
        }
    }

    fn high_card(c: &[Card]) -> Rank {
        let mut cards: [Card; 5] = [c[0], c[1], c[2], c[3], c[4]];
        cards.sort_unstable();
        cards.reverse();
        cards[0].rank
    }

    /// Human-readable summary, used for the hand-reveal line in the audit log.
    pub fn describe(&self) -> String {
        match self.class {
            HandClass::HighCard => format!("{} high", Self::high_card(&self.cards)),
            HandClass::Pair => format!("Pair of {}s", Self::first_paired(&self.cards)),
            HandClass::TwoPair => {
                let first = Self::first_paired(&self.cards);
                let second = Self::first_paired_not(&self.cards, first);
                let mut buf = [first, second];
                buf.sort_unstable();
                buf.reverse();
                format!("Two pair {}s and {}s", buf[0], buf[1])
            }
            HandClass::ThreeOfAKind => format!("Set of {}s", Self::first_set(&self.cards)),
            HandClass::Straight => format!("{} high straight", Self::straight_high(&self.cards)),
            HandClass::Flush => format!("{} high flush", Self::high_card(&self.cards)),
            HandClass::FullHouse => {
                let first = Self::first_set(&self.cards);
                let second = Self::first_paired_not(&self.cards, first);
                format!("Boat {}s full of {}s", first, second)
            }
            HandClass::FourOfAKind => format!("Quad {}s", Self::first_paired(&self.cards)),
            HandClass::StraightFlush => {
                format!("{} high straight flush", Self::straight_high(&self.cards))
            }
        }
    }
}

impl Ord for Hand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.beats(other).into()
    }
}

impl PartialOrd for Hand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Checks all 5-card combinations of the given cards and returns the best
/// 5-card hand(s). More than one entry means a tie.
pub fn best_of_cards(cards: &[Card]) -> Vec<Hand> {
    if cards.len() < 5 {
        return vec![];
    }
    let mut hands: Vec<_> = cards
        .iter()
        .combinations(5)
        .map(|combo| combo.iter().map(|&c| *c).collect::<Vec<Card>>())
        .map(|combo| Hand::new_unchecked(&combo))
        .collect();
    // r.beats(l) instead of l.beats(r) so the best hand ends up at the front
    hands.sort_unstable_by(|l, r| r.beats(l).into());
    let best = hands[0];
    hands
        .into_iter()
        .take_while(|h| h.beats(&best) == WinState::Tie)
        .collect()
}

/// Order all players' best 7-card hands, best-to-worst.
///
/// Returns a `Vec` where each entry is a `Vec` of `(player, Hand)` tied for
/// that rank; the outer `Vec` is ordered best-to-worst.
pub fn best_hands<PID: Copy>(
    pockets: &HashMap<PID, [Card; 2]>,
    community: [Card; 5],
) -> Result<Vec<Vec<(PID, Hand)>>, HandError> {
    if pockets.is_empty() {
        return Ok(vec![]);
    }
    let mut hands = vec![];
    for (player_id, pocket) in pockets {
        let mut cards = Vec::with_capacity(7);
        cards.extend_from_slice(pocket);
        cards.extend_from_slice(&community);
        assert_eq!(cards.len(), 7);
        let hand = best_of_cards(&cards)[0];
        hands.push((player_id, hand));
    }
    // left beats right, because here we want the best to end up at the back of the list
    hands.sort_by(|l, r| l.1.beats(&r.1).into());
    let mut ret: Vec<Vec<(PID, Hand)>> = vec![];
    let mut inner: Vec<(PID, Hand)> = vec![];
    let mut current_best = hands[hands.len() - 1].1;
    while let Some((player_id, hand)) = hands.pop() {
        match hand.cmp(&current_best) {
            Ordering::Equal => inner.push((*player_id, hand)),
            Ordering::Less => {
                ret.push(inner.clone());
                inner.truncate(0);
                inner.push((*player_id, hand));
                current_best = hand;
            }
            Ordering::Greater => unreachable!(),
        };
    }
    if !inner.is_empty() {
        ret.push(inner);
    }
    Ok(ret)
}

#[cfg(test)]
fn cards_from_str(s: &str) -> Vec<Card> {
    let mut v = vec![];
    let mut chars = s.chars();
    while let Some(r) = chars.next() {
        let s = chars.next().expect("need an even number of chars");
        v.push(Card::from([r, s]));
    }
    v
}

#[cfg(test)]
mod test_best_of_cards {
    use super::*;

    fn one_best(s: &str, hc: HandClass, high_card: Card) {
        let hands = best_of_cards(&cards_from_str(s));
        assert_eq!(hands.len(), 1);
        let hand = hands[0];
        assert_eq!(hand.class, hc);
        let card = hand.cards.iter().max().unwrap();
        assert_eq!(card.rank, high_card.rank);
        assert_eq!(card.suit, high_card.suit);
    }

    fn multi_best(s: &str, hc: HandClass, n: usize) {
        let hands = best_of_cards(&cards_from_str(s));
        assert_eq!(hands.len(), n);
        assert_eq!(hands[0].class, hc);
    }

    #[test]
    fn multiple_straights() {
        one_best("Ac2d3h4s5c6dTh", HandClass::Straight, Card::from(['6', 'd']));
    }

    #[test]
    fn multiple_straights_tie() {
        multi_best("Kc2d3h4s5c6d6h", HandClass::Straight, 2);
        multi_best("2d3h4s5c6d6h6s", HandClass::Straight, 3);
    }

    #[test]
    fn straight_vs_flush() {
        one_best("Th9s8h7h6h5h2c", HandClass::Flush, Card::from(['T', 'h']));
    }
}

#[cfg(test)]
mod test_best_hands {
    use super::*;

    #[test]
    fn basic() {
        let mut map: HashMap<i32, [Card; 2]> = HashMap::new();
        map.insert(1, [Card::from(['A', 'c']), Card::from(['A', 'd'])]);
        map.insert(2, [Card::from(['A', 'h']), Card::from(['A', 's'])]);
        map.insert(3, [Card::from(['K', 'h']), Card::from(['K', 's'])]);
        let comm = [
            Card::from(['2', 'c']),
            Card::from(['3', 'd']),
            Card::from(['5', 'h']),
            Card::from(['9', 's']),
            Card::from(['T', 'c']),
        ];
        let ret = best_hands(&map, comm).unwrap();
        assert_eq!(ret.len(), 2);
        assert_eq!(ret[0].len(), 2);
        assert_eq!(ret[1].len(), 1);
        assert_eq!(ret[0][0].1.class, HandClass::Pair);
        assert_eq!(ret[0][0].1.cards[0].rank, Rank::Ace);
        assert_eq!(ret[1][0].1.class, HandClass::Pair);
        assert_eq!(ret[1][0].1.cards[0].rank, Rank::King);
    }
}

#[cfg(test)]
mod test_hand {
    use super::*;
    use crate::cards::deck::Deck;
    use std::iter;

    #[test]
    fn wrong_sizes() {
        let mut deck = Deck::default();
        for n in [0, 1, 2, 3, 4, 6, 7] {
            let cards: Vec<Card> = iter::repeat_with(|| deck.draw().unwrap()).take(n).collect();
            assert!(Hand::new(&cards).is_err());
        }
    }

    #[test]
    fn correct_size() {
        let mut deck = Deck::default();
        let cards: Vec<Card> = iter::repeat_with(|| deck.draw().unwrap()).take(5).collect();
        assert!(Hand::new(&cards).is_ok());
    }

    fn beats_helper1(s1: &str, s2: &str) {
        let h1 = Hand::new_unchecked(&cards_from_str(s1));
        let h2 = Hand::new_unchecked(&cards_from_str(s2));
        assert!(h1 > h2);
        assert!(h2 < h1);
        assert_eq!(h1, h1.clone());
        assert_eq!(h1.beats(&h2), WinState::Win);
        assert_eq!(h2.beats(&h1), WinState::Lose);
        assert_eq!(h1.beats(&h1.clone()), WinState::Tie);
    }

    #[test]
    fn beats() {
        for (s1, s2) in [("AsKsQsJsTs", "KdQdJdTd9d"), ("AsKsQsJsTs", "Td8s6d4d2d")] {
            beats_helper1(s1, s2);
        }
    }
}

#[cfg(test)]
mod test_hand_describe {
    use super::*;

    fn is(hand: &str, desc: &str) {
        assert_eq!(Hand::new_unchecked(&cards_from_str(hand)).describe(), desc);
    }

    #[test]
    fn high_card() {
        is("Ah6h5d4c3s", "A high");
        is("7c5d4h3s2s", "7 high");
    }

    #[test]
    fn pair() {
        is("AcKdQh6s6c", "Pair of 6s");
        is("AcAs6cKdQh", "Pair of As");
    }

    #[test]
    fn two_pair() {
        is("AcAdKcKd4d", "Two pair As and Ks");
        is("6c2c4s6d2d", "Two pair 6s and 2s");
    }

    #[test]
    fn set() {
        is("AcAdAhKcQc", "Set of As");
        is("TcKdThTsQc", "Set of Ts");
    }

    #[test]
    fn straight() {
        is("AdKsQsJsTs", "A high straight");
        is("Ad2s4s3s5s", "5 high straight");
        is("8d4s6s5s7s", "8 high straight");
    }

    #[test]
    fn flush() {
        is("Ac8c7c6c5c", "A high flush");
        is("7c6c5c4c2c", "7 high flush");
    }

    #[test]
    fn full_house() {
        is("AcKcAdKdAs", "Boat As full of Ks");
        is("2cKc2dKd2s", "Boat 2s full of Ks");
    }

    #[test]
    fn quads() {
        is("AcAdAhAsKc", "Quad As");
        is("2c2d2h2s3c", "Quad 2s");
    }

    #[test]
    fn straight_flush() {
        is("AsKsQsJsTs", "A high straight flush");
        is("As2s4s3s5s", "5 high straight flush");
    }
}

#[cfg(test)]
mod test_hand_class {
    use super::*;
    use crate::cards::card::{Suit, ALL_RANKS, ALL_SUITS};

    #[test]
    fn straight_flushes() {
        for window in ALL_RANKS.windows(5) {
            for suit in ALL_SUITS {
                let cards: Vec<Card> = window.iter().map(|&r| Card::new(suit, r)).collect();
                assert_eq!(HandClass::which(&cards), HandClass::StraightFlush);
            }
        }
    }

    #[test]
    fn quads() {
        for rank in ALL_RANKS {
            let extra = Card::new(
                Suit::Club,
                match rank {
                    Rank::Two => Rank::Three,
                    _ => Rank::Two,
                },
            );
            let cards = [
                Card::new(Suit::Club, rank),
                Card::new(Suit::Diamond, rank),
                Card::new(Suit::Heart, rank),
                Card::new(Suit::Spade, rank),
                extra,
            ];
            assert_eq!(HandClass::which(&cards), HandClass::FourOfAKind);
        }
    }

    #[test]
    fn boat() {
        for rank3 in ALL_RANKS {
            for rank2 in ALL_RANKS {
                if rank2 == rank3 {
                    continue;
                }
                let cards = [
                    Card::new(Suit::Club, rank3),
                    Card::new(Suit::Diamond, rank3),
                    Card::new(Suit::Heart, rank3),
                    Card::new(Suit::Club, rank2),
                    Card::new(Suit::Diamond, rank2),
                ];
                assert_eq!(HandClass::which(&cards), HandClass::FullHouse);
            }
        }
    }

    #[test]
    fn flush() {
        for ranks in [
            [Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Two],
            [Rank::Ten, Rank::Eight, Rank::Six, Rank::Four, Rank::Two],
        ] {
            for suit in ALL_SUITS {
                let cards: Vec<Card> = ranks.iter().map(|&r| Card::new(suit, r)).collect();
                assert_eq!(HandClass::which(&cards), HandClass::Flush);
            }
        }
    }

    #[test]
    fn straight() {
        for window in ALL_RANKS.windows(5) {
            let cards: Vec<Card> = window
                .iter()
                .enumerate()
                .map(|(i, &r)| Card::new(if i == 4 { Suit::Spade } else { Suit::Club }, r))
                .collect();
            assert_eq!(HandClass::which(&cards), HandClass::Straight);
        }
    }

    #[test]
    fn set() {
        for rank in ALL_RANKS {
            let r2 = match rank {
                Rank::Two => Rank::Three,
                _ => Rank::Two,
            };
            let r3 = match rank {
                Rank::Ace => Rank::King,
                _ => Rank::Ace,
            };
            let cards = [
                Card::new(Suit::Club, rank),
                Card::new(Suit::Diamond, rank),
                Card::new(Suit::Heart, rank),
                Card::new(Suit::Club, r2),
                Card::new(Suit::Club, r3),
            ];
            assert_eq!(HandClass::which(&cards), HandClass::ThreeOfAKind);
        }
    }

    #[test]
    fn pair() {
        for rank in ALL_RANKS {
            let r1 = match rank {
                Rank::Two => Rank::Three,
                _ => Rank::Two,
            };
            let r2 = match rank {
                Rank::Four => Rank::Five,
                _ => Rank::Four,
            };
            let r3 = match rank {
                Rank::Six => Rank::Seven,
                _ => Rank::Six,
            };
            let cards = [
                Card::new(Suit::Club, r1),
                Card::new(Suit::Club, r2),
                Card::new(Suit::Club, r3),
                Card::new(Suit::Club, rank),
                Card::new(Suit::Diamond, rank),
            ];
            assert_eq!(HandClass::which(&cards), HandClass::Pair);
        }
    }
}

#[cfg(test)]
mod test_hand_class_beats {
    use super::*;

    fn win_lose(s1: &str, s2: &str, hc: HandClass) {
        let h1 = Hand::new_unchecked(&cards_from_str(s1));
        let h2 = Hand::new_unchecked(&cards_from_str(s2));
        assert_eq!(h1.class, hc);
        assert_eq!(h2.class, hc);
        assert_eq!(h1.beats(&h2), WinState::Win);
        assert_eq!(h2.beats(&h1), WinState::Lose);
    }

    fn tie(s1: &str, s2: &str, hc: HandClass) {
        let h1 = Hand::new_unchecked(&cards_from_str(s1));
        let h2 = Hand::new_unchecked(&cards_from_str(s2));
        assert_eq!(h1.class, hc);
        assert_eq!(h2.class, hc);
        assert_eq!(h1.beats(&h2), WinState::Tie);
    }

    #[test]
    fn quads_tie() {
        tie("2c2d2h2s3c", "2c2d2h2s3d", HandClass::FourOfAKind);
    }

    #[test]
    fn full_house_tie() {
        tie("AcAdAhKcKd", "AdAhAsKhKs", HandClass::FullHouse);
    }

    #[test]
    fn flush_tie() {
        tie("AsKsQsJs2s", "AdKdQdJd2d", HandClass::Flush);
    }

    #[test]
    fn straight_tie() {
        tie("AsKsQsJsTd", "AcKcQcJcTs", HandClass::Straight);
    }

    #[test]
    fn set_tie() {
        tie("AcAdAh4s3d", "AsAcAd4c3s", HandClass::ThreeOfAKind);
    }

    #[test]
    fn two_pair_tie() {
        tie("AsAsKsKsTd", "AcAcKcKcTs", HandClass::TwoPair);
    }

    #[test]
    fn pair_tie() {
        tie("AcAd5h4s3d", "AcAd5s4c3h", HandClass::Pair);
    }

    #[test]
    fn high_card_tie() {
        tie("KcQdJhTs5c", "KdQhJsTc5d", HandClass::HighCard);
    }

    #[test]
    fn straight_flush_tie() {
        for (s1, s2) in [
            ("AcKcQcJcTc", "AdKdQdJdTd"),
            ("5c4c3c2cAc", "5d4d3d2dAd"),
        ] {
            tie(s1, s2, HandClass::StraightFlush);
        }
    }

    #[test]
    fn straight_flush() {
        for (s1, s2) in [
            ("AcKcQcJcTc", "KdQdJdTd9d"),
            ("6c5c4c3c2c", "5d4d3d2dAd"),
        ] {
            win_lose(s1, s2, HandClass::StraightFlush);
        }
    }

    #[test]
    fn quads() {
        for (s1, s2) in [("4c4d4h4s3c", "3c3d3h3s2d"), ("4c4d4h4s5c", "4c4d4h4s3c")] {
            win_lose(s1, s2, HandClass::FourOfAKind);
        }
    }

    #[test]
    fn full_house() {
        for (s1, s2) in [("4c4d4h3s3c", "3c3d3h2s2d"), ("4c4d4h5s5c", "4c4d4h3s3c")] {
            win_lose(s1, s2, HandClass::FullHouse);
        }
    }

    #[test]
    fn flush() {
        for (s1, s2) in [("AsKsQsJs3s", "AdKdQdJd2d"), ("As6s5s4s3s", "Kd7d6d5d4d")] {
            win_lose(s1, s2, HandClass::Flush);
        }
    }

    #[test]
    fn straight() {
        for (s1, s2) in [
            ("AsKsQsJsTd", "KcQcJcTc9s"),
            ("AsKsQsJsTd", "Ac2c3c4c5s"),
            ("6s5s4s3s2d", "Ac2c3c4c5s"),
        ] {
            win_lose(s1, s2, HandClass::Straight);
        }
    }

    #[test]
    fn set() {
        for (s1, s2) in [
            ("AcAdAh4s3d", "AsAcAd3c2s"),
            ("9c9d9hTsJd", "9s9c9d2c3s"),
            ("9c9d9h6s3d", "9s9c9d3c2s"),
        ] {
            win_lose(s1, s2, HandClass::ThreeOfAKind);
        }
    }

    #[test]
    fn two_pair() {
        for (s1, s2) in [("AsAsKsKsJd", "AcAcKcKcTs"), ("AsAsKsKsJd", "AcAcQcQcKs")] {
            win_lose(s1, s2, HandClass::TwoPair);
        }
    }

    #[test]
    fn pair() {
        for (s1, s2) in [
            ("AcAdKh4s3d", "AcAd5h4s3d"),
            ("AcAd5h4s3d", "AcAd5h4s2d"),
            ("2c2d6h4s3d", "2c2d5h4s3d"),
        ] {
            win_lose(s1, s2, HandClass::Pair);
        }
    }

    #[test]
    fn high_card() {
        for (s1, s2) in [
            ("Ac7d6h5s4d", "Ac6d5h4s3d"),
            ("AcKdQhJs7d", "AcKdQhJs3d"),
            ("8c7d6h4s3d", "7c6d5h3s2d"),
        ] {
            win_lose(s1, s2, HandClass::HighCard);
        }
    }
}
