//! Double-entry ledger adapter. Grounded in the teacher's `Account::mod_settled_balance`
//! (read-modify-write balance inside one `conn.transaction`) and `money_log` (one row per balance
//! change, kept as an append-only audit trail rather than overwritten). Every posting here is a
//! pair of rows — a debit and a credit — instead of the teacher's single balance mutation, so a
//! table's chip float always nets to zero against the house/world accounts.
use crate::database::models::{LedgerAccountRow, NewLedgerPostingRow};
use crate::database::schema::{ledger_accounts, ledger_postings};
use crate::database::DbConn;
use crate::error::ServerError;
use chrono::Utc;
use diesel::prelude::*;
use poker_core::ids::{HandId, SessionId, UserId};
use poker_core::{Currency, PotId};
use uuid::Uuid;

/// Ledger account names, bit-exact with spec.md §3: `world`, `player:<uuid>:wallet`,
/// `session:<uuid>:<uuid>`, `system:tournament_pool:<uuid>`, `revenue:rake`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Account {
    World,
    Wallet(UserId),
    Session(UserId, SessionId),
    TournamentPool(Uuid),
    Rake,
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Account::World => write!(f, "world"),
            Account::Wallet(u) => write!(f, "player:{u}:wallet"),
            Account::Session(u, s) => write!(f, "session:{u}:{s}"),
            Account::TournamentPool(id) => write!(f, "system:tournament_pool:{id}"),
            Account::Rake => write!(f, "revenue:rake"),
        }
    }
}

fn idempotency_key(hand_id: HandId, pot_id: PotId) -> String {
    format!("{hand_id}:{pot_id}")
}

/// One ledger transaction: a list of debit/credit legs that must net to zero, submitted as one
/// `diesel` transaction so the ledger's atomicity guarantee actually holds.
struct Posting {
    from: Account,
    to: Account,
    amount: Currency,
}

/// Post a set of double-entry legs under a single idempotency key, skipping entirely (returning
/// `Ok(false)`) if that key has already been committed. This is the one primitive every public
/// operation below composes.
async fn post(db: &DbConn, tx_id: Uuid, key: String, legs: Vec<Posting>) -> Result<bool, ServerError> {
    db.run(move |conn| {
        conn.transaction::<bool, diesel::result::Error, _>(|| {
            let already: i64 = ledger_postings::table
                .filter(ledger_postings::idempotency_key.eq(&key))
                .count()
                .get_result(conn)?;
            if already > 0 {
                return Ok(false);
            }

            for leg in &legs {
                let from_balance = balance_for_update(conn, &leg.from.to_string())?;
                if leg.from != Account::World && from_balance < leg.amount.cents() {
                    return Err(diesel::result::Error::RollbackTransaction);
                }
                adjust_balance(conn, &leg.from.to_string(), -leg.amount.cents())?;
                adjust_balance(conn, &leg.to.to_string(), leg.amount.cents())?;
            }

            let now = Utc::now().naive_utc();
            for leg in legs {
                diesel::insert_into(ledger_postings::table)
                    .values(NewLedgerPostingRow {
                        id: Uuid::new_v4().as_bytes().to_vec(),
                        tx_id: tx_id.as_bytes().to_vec(),
                        from_account: leg.from.to_string(),
                        to_account: leg.to.to_string(),
                        amount: leg.amount.cents(),
                        idempotency_key: key.clone(),
                        metadata: String::new(),
                        created_at: now,
                    })
                    .execute(conn)?;
            }
            Ok(true)
        })
    })
    .await
    .map_err(|e| match e {
        diesel::result::Error::RollbackTransaction => ServerError::InsufficientFunds,
        other => ServerError::from(other),
    })
}

fn balance_for_update(
    conn: &diesel::SqliteConnection,
    account: &str,
) -> Result<i64, diesel::result::Error> {
    let existing: Option<LedgerAccountRow> = ledger_accounts::table.find(account).first(conn).optional()?;
    Ok(existing.map(|r| r.balance).unwrap_or(0))
}

fn adjust_balance(
    conn: &diesel::SqliteConnection,
    account: &str,
    delta_cents: i64,
) -> Result<(), diesel::result::Error> {
    let existing: Option<LedgerAccountRow> = ledger_accounts::table.find(account).first(conn).optional()?;
    match existing {
        Some(row) => {
            diesel::update(ledger_accounts::table.find(account))
                .set(ledger_accounts::balance.eq(row.balance + delta_cents))
                .execute(conn)?;
        }
        None => {
            diesel::insert_into(ledger_accounts::table)
                .values(LedgerAccountRow {
                    account: account.to_string(),
                    balance: delta_cents,
                })
                .execute(conn)?;
        }
    }
    Ok(())
}

/// `player:…:wallet → session:…:…`. `tx_id` is the caller-supplied transaction id returned to
/// the caller as `txId`.
pub async fn transfer_to_game(
    db: &DbConn,
    tx_id: Uuid,
    user: UserId,
    session: SessionId,
    amount: Currency,
) -> Result<bool, ServerError> {
    post(
        db,
        tx_id,
        tx_id.to_string(),
        vec![Posting {
            from: Account::Wallet(user),
            to: Account::Session(user, session),
            amount,
        }],
    )
    .await
}

/// Reverse of [`transfer_to_game`]: `session:…:… → player:…:wallet`.
pub async fn transfer_from_game(
    db: &DbConn,
    tx_id: Uuid,
    user: UserId,
    session: SessionId,
    amount: Currency,
) -> Result<bool, ServerError> {
    post(
        db,
        tx_id,
        tx_id.to_string(),
        vec![Posting {
            from: Account::Session(user, session),
            to: Account::Wallet(user),
            amount,
        }],
    )
    .await
}

/// `world → system:tournament_pool:<tournament>`, buy-in folded into the pool rather than a
/// per-table session.
pub async fn process_tournament_buy_in(
    db: &DbConn,
    tx_id: Uuid,
    user: UserId,
    tournament: Uuid,
    amount: Currency,
) -> Result<bool, ServerError> {
    post(
        db,
        tx_id,
        tx_id.to_string(),
        vec![
            Posting { from: Account::Wallet(user), to: Account::World, amount },
            Posting { from: Account::World, to: Account::TournamentPool(tournament), amount },
        ],
    )
    .await
}

pub async fn distribute_tournament_prize(
    db: &DbConn,
    tx_id: Uuid,
    user: UserId,
    tournament: Uuid,
    amount: Currency,
) -> Result<bool, ServerError> {
    post(
        db,
        tx_id,
        tx_id.to_string(),
        vec![
            Posting { from: Account::TournamentPool(tournament), to: Account::World, amount },
            Posting { from: Account::World, to: Account::Wallet(user), amount },
        ],
    )
    .await
}

/// A single rake posting for one hand, `session:…:… → revenue:rake`. Policy (percentage, floor,
/// cap) is decided by the caller (`table_actor`, reading `config::RakePolicy`); this function
/// only moves the already-computed amount.
pub async fn collect_rake(
    db: &DbConn,
    hand_id: HandId,
    user: UserId,
    session: SessionId,
    amount: Currency,
) -> Result<bool, ServerError> {
    if amount == Currency::ZERO {
        return Ok(false);
    }
    post(
        db,
        hand_id.0,
        format!("{hand_id}:rake:{session}"),
        vec![Posting { from: Account::Session(user, session), to: Account::Rake, amount }],
    )
    .await
}

/// One posting per `(losing session, winning session)` leg, idempotent per `(hand_id, pot_id)` —
/// spec.md §4.4's "from each losing session-account to the winning session-account". `legs` is
/// already split by the caller (`table_actor::settle_hand`, dividing each pot's amount evenly
/// across its losing contributors).
pub async fn distribute_winnings(
    db: &DbConn,
    hand_id: HandId,
    pot_id: PotId,
    legs: Vec<(Account, Account, Currency)>,
) -> Result<bool, ServerError> {
    let postings = legs
        .into_iter()
        .map(|(from, to, amount)| Posting { from, to, amount })
        .collect();
    post(db, hand_id.0, idempotency_key(hand_id, pot_id), postings).await
}

/// Current balance for an account, `Currency::ZERO` if it has never been posted to.
pub async fn get_balance(db: &DbConn, account: Account) -> Result<Currency, ServerError> {
    let key = account.to_string();
    let row: Option<LedgerAccountRow> = db
        .run(move |conn| ledger_accounts::table.find(key).first(conn).optional())
        .await?;
    Ok(row.map(|r| Currency::from_cents(r.balance)).unwrap_or(Currency::ZERO))
}

pub async fn validate_main_balance(
    db: &DbConn,
    user: UserId,
    required: Currency,
) -> Result<bool, ServerError> {
    Ok(get_balance(db, Account::Wallet(user)).await? >= required)
}

pub async fn validate_session_balance(
    db: &DbConn,
    user: UserId,
    session: SessionId,
    required: Currency,
) -> Result<bool, ServerError> {
    Ok(get_balance(db, Account::Session(user, session)).await? >= required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_names_match_spec_format() {
        let user = UserId::new();
        let session = SessionId::new();
        assert_eq!(Account::Wallet(user).to_string(), format!("player:{user}:wallet"));
        assert_eq!(
            Account::Session(user, session).to_string(),
            format!("session:{user}:{session}")
        );
        assert_eq!(Account::World.to_string(), "world");
        assert_eq!(Account::Rake.to_string(), "revenue:rake");
    }

    #[test]
    fn idempotency_key_is_stable_per_hand_and_pot() {
        let hand = HandId::new();
        let k1 = idempotency_key(hand, 0);
        let k2 = idempotency_key(hand, 0);
        assert_eq!(k1, k2);
        assert_ne!(k1, idempotency_key(hand, 1));
    }
}
