//! The runtime's error taxonomy. Extends the teacher's `database::DbError`-style
//! one-enum-per-crate pattern with the Concurrency/Resource/Lifecycle classes spec.md §7 names,
//! `#[from]`-wrapping `poker_core::GameError` and `diesel::result::Error` instead of the manual
//! `From` impls the teacher hand-wrote for `DbError`.
use derive_more::{Display, Error, From};
use poker_core::GameError;

#[derive(Debug, Display, Error, From)]
pub enum ServerError {
    /// A pure Hand-Engine/Aggregate rejection: bad command, out of turn, etc.
    Game(GameError),
    /// The Event Store's compare-and-set lost a race: another writer already advanced this
    /// aggregate past the version this command expected.
    ConcurrencyConflict,
    /// A session already exists for this `(user, table)` pair.
    SessionExists,
    /// The ledger reports a balance too low to cover the requested posting.
    InsufficientFunds,
    /// A player tried to act with more chips committed than they have.
    InsufficientChips,
    /// The ledger could not be reached or the transaction failed for a reason unrelated to
    /// balance.
    LedgerUnavailable,
    /// A per-turn or per-hand timer fired before the expected actor responded.
    Timeout,
    /// The operation was cancelled, e.g. the table actor shut down mid-command.
    Cancelled,
    /// The caller's bearer token didn't resolve to an authorized session.
    Unauthorized,
    Db(diesel::result::Error),
}
