use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Day-month-year format for the human-readable history date, rendered in
/// local time when the entry is built.
pub const HISTORY_DATE_FORMAT: &str = "%d %b %Y";

#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub point: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable record of one change made to a ticket. The `user` field is a
/// snapshot of the acting user's display name at the time of the event.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub date: String,
    pub title: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(ticket_id: Uuid, title: String, user: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            date: Local::now().format(HISTORY_DATE_FORMAT).to_string(),
            title,
            user,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub status: String,
    pub point: i64,
}

impl CreateTicketRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if self.status.trim().is_empty() {
            return Err(AppError::Validation("status must not be empty".to_string()));
        }
        if self.point < 0 {
            return Err(AppError::Validation(
                "point must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditTicketRequest {
    pub title: String,
    pub description: String,
    pub point: i64,
}

impl EditTicketRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if self.point < 0 {
            return Err(AppError::Validation(
                "point must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssigneeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// One ticket in the listing, enriched with the owner's directory record.
#[derive(Debug, Clone, Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub point: i64,
    pub user: String,
    pub profile_pic: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HistoryView {
    pub date: String,
    pub title: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketDetailResponse {
    pub id: Uuid,
    pub username: String,
    pub profile_pic: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub point: i64,
    pub history: Vec<HistoryView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SummaryRow {
    pub status: String,
    pub total_task: i64,
    pub point: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PerformanceResponse {
    pub total_task: i64,
    pub completed_task: i64,
    pub uncompleted_task: i64,
    pub total_point: i64,
    pub completed_point: i64,
    pub uncompleted_point: i64,
    pub task_percentage: String,
    pub point_percentage: String,
}
