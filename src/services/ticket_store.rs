use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ticket::{EditTicketRequest, HistoryEntry, Ticket};
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPointSum {
    pub status: String,
    pub point: i64,
}

/// Durable persistence for tickets and their history. Every mutating
/// operation is one atomic unit: exactly one ticket-row mutation plus exactly
/// one history insert, committed or discarded together.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create_ticket(&self, ticket: Ticket, history: HistoryEntry) -> AppResult<()>;

    async fn get_all_tickets(&self) -> AppResult<Vec<Ticket>>;

    async fn get_ticket_by_id(&self, ticket_id: Uuid) -> AppResult<Ticket>;

    async fn get_history_by_ticket_id(&self, ticket_id: Uuid) -> AppResult<Vec<HistoryEntry>>;

    async fn reassign_owner(
        &self,
        owner_id: &str,
        ticket_id: Uuid,
        history: HistoryEntry,
    ) -> AppResult<()>;

    async fn edit_ticket(
        &self,
        edits: EditTicketRequest,
        ticket_id: Uuid,
        history: HistoryEntry,
    ) -> AppResult<()>;

    async fn change_status(
        &self,
        status: &str,
        ticket_id: Uuid,
        history: HistoryEntry,
    ) -> AppResult<()>;

    async fn count_by_status(&self, user_id: &str) -> AppResult<Vec<StatusCount>>;

    async fn sum_points_by_status(&self, user_id: &str) -> AppResult<Vec<StatusPointSum>>;

    async fn count_done(&self, user_id: &str) -> AppResult<i64>;

    async fn count_total(&self, user_id: &str) -> AppResult<i64>;

    async fn sum_points_done(&self, user_id: &str) -> AppResult<i64>;

    async fn sum_points_total(&self, user_id: &str) -> AppResult<i64>;
}
