//! Fixed-point money. One unit is one cent; `Display` renders dollars.cents.
//! Every chip count, bet, pot and ledger posting in this crate flows through
//! this type instead of a bare integer so that a currency unit can never be
//! silently added to a seat index or a hand number.
use derive_more::{Add, AddAssign, Div, From, Mul, Rem, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Default,
    Hash,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Div,
    Rem,
    Mul,
    Sum,
    From,
    Serialize,
    Deserialize,
    derive_more::Deref,
)]
pub struct Currency(i64);

impl Currency {
    pub const ZERO: Currency = Currency(0);

    pub const fn from_cents(cents: i64) -> Self {
        Currency(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let dollars = self.0 / 100;
        let cents = (self.0 - (dollars * 100)).abs();
        write!(f, "{}.{:02}", dollars, cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_as_dollars_and_cents() {
        assert_eq!(Currency::from_cents(150).to_string(), "1.50");
        assert_eq!(Currency::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn arithmetic_is_exact() {
        let a = Currency::from_cents(150);
        let b = Currency::from_cents(250);
        assert_eq!(a + b, Currency::from_cents(400));
        assert_eq!(b - a, Currency::from_cents(100));
    }
}
