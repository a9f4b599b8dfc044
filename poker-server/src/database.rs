//! Pooled SQLite access. One fairing (`DbConn`) backs both the Event Store and the Ledger
//! Adapter, the same split the teacher used for its `accounts`/`money_log` tables.
pub mod models;
pub mod schema;

use rocket_sync_db_pools::{database, diesel};

#[database("sqlite")]
pub struct DbConn(diesel::SqliteConnection);
