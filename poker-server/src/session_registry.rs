//! In-memory `(userId, tableId) -> Session` directory. Grounded in the teacher's `seated` join
//! table (`table_id + account_id` composite key, one active row per pair) and `player_meta`;
//! generalized from a DB-row lookup into a `HashMap` behind a `tokio::sync::RwLock` since a
//! Table Actor only ever needs this state for the lifetime of the process, not across restarts —
//! durable identity lives in the Event Store's `PlayerSeated`/`PlayerLeft` events instead.
use poker_core::ids::{SessionId, TableId, UserId};
use poker_core::Currency;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Finished,
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub table_id: TableId,
    pub seat_number: Option<u8>,
    pub buy_in_amount: Currency,
    pub current_chips: Currency,
    pub status: SessionStatus,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub left_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Session {
    fn new(user_id: UserId, table_id: TableId, buy_in_amount: Currency) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            table_id,
            seat_number: None,
            buy_in_amount,
            current_chips: buy_in_amount,
            status: SessionStatus::Active,
            joined_at: chrono::Utc::now(),
            left_at: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<(UserId, TableId), Session>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a new active session. Fails the spec's "at most one active session per
    /// `(userId, tableId)`" invariant by returning `None` if one already exists — the Table
    /// Actor maps that to `ServerError::SessionExists`.
    pub async fn create(
        &self,
        user_id: UserId,
        table_id: TableId,
        buy_in_amount: Currency,
    ) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&(user_id, table_id)) {
            if existing.status == SessionStatus::Active {
                return None;
            }
        }
        let session = Session::new(user_id, table_id, buy_in_amount);
        sessions.insert((user_id, table_id), session.clone());
        Some(session)
    }

    pub async fn get_active(&self, user_id: UserId, table_id: TableId) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&(user_id, table_id))
            .filter(|s| s.status == SessionStatus::Active)
            .cloned()
    }

    pub async fn is_real_money(&self, user_id: UserId, table_id: TableId) -> bool {
        // Every session in this registry backs a real-money ledger sub-account; there is no
        // play-money mode in this workspace's scope.
        self.get_active(user_id, table_id).await.is_some()
    }

    pub async fn set_seat(&self, user_id: UserId, table_id: TableId, seat: u8) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&(user_id, table_id)) {
            session.seat_number = Some(seat);
        }
    }

    pub async fn update_chips(&self, user_id: UserId, table_id: TableId, current_chips: Currency) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&(user_id, table_id)) {
            session.current_chips = current_chips;
        }
    }

    pub async fn finish(
        &self,
        user_id: UserId,
        table_id: TableId,
        final_chips: Currency,
    ) -> Option<Session> {
        self.close(user_id, table_id, final_chips, SessionStatus::Finished)
            .await
    }

    pub async fn abandon(&self, user_id: UserId, table_id: TableId) -> Option<Session> {
        let final_chips = self.get_active(user_id, table_id).await?.current_chips;
        self.close(user_id, table_id, final_chips, SessionStatus::Abandoned)
            .await
    }

    async fn close(
        &self,
        user_id: UserId,
        table_id: TableId,
        final_chips: Currency,
        status: SessionStatus,
    ) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&(user_id, table_id))?;
        if session.status != SessionStatus::Active {
            return None;
        }
        session.current_chips = final_chips;
        session.status = status;
        session.left_at = Some(chrono::Utc::now());
        Some(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_one_active_session_per_user_and_table() {
        let registry = SessionRegistry::new();
        let user = UserId::new();
        let table = TableId::new();
        assert!(registry.create(user, table, Currency::from_cents(10_000)).await.is_some());
        assert!(registry.create(user, table, Currency::from_cents(10_000)).await.is_none());
    }

    #[tokio::test]
    async fn finishing_frees_the_slot_for_a_new_session() {
        let registry = SessionRegistry::new();
        let user = UserId::new();
        let table = TableId::new();
        registry.create(user, table, Currency::from_cents(5_000)).await;
        registry.finish(user, table, Currency::from_cents(7_500)).await;
        assert!(registry.get_active(user, table).await.is_none());
        assert!(registry.create(user, table, Currency::from_cents(5_000)).await.is_some());
    }
}
