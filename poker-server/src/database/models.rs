use super::schema::{events, ledger_accounts, ledger_postings};
use chrono::NaiveDateTime;

/// One row of the append-only event log. `payload` is the `DomainEvent` serialized to JSON —
/// the store stays schema-free, matching spec.md §6's "self-describing record" shape.
#[derive(Debug, Clone, Queryable)]
pub struct EventRow {
    pub id: Vec<u8>,
    pub aggregate_id: Vec<u8>,
    pub version: i64,
    pub kind: String,
    pub payload: String,
    pub user_id: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[table_name = "events"]
pub struct NewEventRow {
    pub id: Vec<u8>,
    pub aggregate_id: Vec<u8>,
    pub version: i64,
    pub kind: String,
    pub payload: String,
    pub user_id: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
pub struct LedgerPostingRow {
    pub id: Vec<u8>,
    pub tx_id: Vec<u8>,
    pub from_account: String,
    pub to_account: String,
    pub amount: i64,
    pub idempotency_key: String,
    pub metadata: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[table_name = "ledger_postings"]
pub struct NewLedgerPostingRow {
    pub id: Vec<u8>,
    pub tx_id: Vec<u8>,
    pub from_account: String,
    pub to_account: String,
    pub amount: i64,
    pub idempotency_key: String,
    pub metadata: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, AsChangeset)]
#[table_name = "ledger_accounts"]
#[primary_key(account)]
pub struct LedgerAccountRow {
    pub account: String,
    pub balance: i64,
}
