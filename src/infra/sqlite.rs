use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use crate::domain::ticket::{EditTicketRequest, HistoryEntry, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::{StatusCount, StatusPointSum, TicketStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tickets (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    point INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS history_ticket (
    id TEXT PRIMARY KEY,
    ticket_id TEXT NOT NULL REFERENCES tickets(id),
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    user TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_ticket_ticket_id ON history_ticket(ticket_id);
"#;

pub async fn connect(path: &str) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

pub struct SqliteTicketStore {
    pool: SqlitePool,
}

impl SqliteTicketStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    user_id: String,
    title: String,
    description: String,
    status: String,
    point: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> AppResult<Ticket> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|err| AppError::Store(format!("invalid ticket id in store: {err}")))?;
        Ok(Ticket {
            id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            status: self.status,
            point: self.point,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    ticket_id: String,
    date: String,
    title: String,
    user: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_entry(self) -> AppResult<HistoryEntry> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|err| AppError::Store(format!("invalid history id in store: {err}")))?;
        let ticket_id = Uuid::parse_str(&self.ticket_id)
            .map_err(|err| AppError::Store(format!("invalid ticket id in store: {err}")))?;
        Ok(HistoryEntry {
            id,
            ticket_id,
            date: self.date,
            title: self.title,
            user: self.user,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

async fn insert_history(tx: &mut Transaction<'_, Sqlite>, entry: &HistoryEntry) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO history_ticket (id, ticket_id, date, title, user, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(entry.id.to_string())
    .bind(entry.ticket_id.to_string())
    .bind(&entry.date)
    .bind(&entry.title)
    .bind(&entry.user)
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
    async fn create_ticket(&self, ticket: Ticket, history: HistoryEntry) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tickets (id, user_id, title, description, status, point, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(ticket.id.to_string())
        .bind(&ticket.user_id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.status)
        .bind(ticket.point)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_history(&mut tx, &history).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_all_tickets(&self) -> AppResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            "SELECT id, user_id, title, description, status, point, created_at, updated_at
             FROM tickets",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn get_ticket_by_id(&self, ticket_id: Uuid) -> AppResult<Ticket> {
        let row = sqlx::query_as::<_, TicketRow>(
            "SELECT id, user_id, title, description, status, point, created_at, updated_at
             FROM tickets WHERE id = ?1",
        )
        .bind(ticket_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("ticket {ticket_id}")))?
            .into_ticket()
    }

    async fn get_history_by_ticket_id(&self, ticket_id: Uuid) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT id, ticket_id, date, title, user, created_at, updated_at
             FROM history_ticket WHERE ticket_id = ?1",
        )
        .bind(ticket_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }

    async fn reassign_owner(
        &self,
        owner_id: &str,
        ticket_id: Uuid,
        history: HistoryEntry,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE tickets SET user_id = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(owner_id)
            .bind(history.updated_at)
            .bind(ticket_id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("ticket {ticket_id}")));
        }

        insert_history(&mut tx, &history).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn edit_ticket(
        &self,
        edits: EditTicketRequest,
        ticket_id: Uuid,
        history: HistoryEntry,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE tickets SET title = ?1, description = ?2, point = ?3, updated_at = ?4
             WHERE id = ?5",
        )
        .bind(&edits.title)
        .bind(&edits.description)
        .bind(edits.point)
        .bind(history.updated_at)
        .bind(ticket_id.to_string())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("ticket {ticket_id}")));
        }

        insert_history(&mut tx, &history).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn change_status(
        &self,
        status: &str,
        ticket_id: Uuid,
        history: HistoryEntry,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(history.updated_at)
            .bind(ticket_id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("ticket {ticket_id}")));
        }

        insert_history(&mut tx, &history).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count_by_status(&self, user_id: &str) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM tickets WHERE user_id = ?1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn sum_points_by_status(&self, user_id: &str) -> AppResult<Vec<StatusPointSum>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COALESCE(SUM(point), 0) FROM tickets
             WHERE user_id = ?1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(status, point)| StatusPointSum { status, point })
            .collect())
    }

    async fn count_done(&self, user_id: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE user_id = ?1 AND status = 'done'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_total(&self, user_id: &str) -> AppResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn sum_points_done(&self, user_id: &str) -> AppResult<i64> {
        let sum = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(point), 0) FROM tickets WHERE user_id = ?1 AND status = 'done'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sum)
    }

    async fn sum_points_total(&self, user_id: &str) -> AppResult<i64> {
        let sum = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(point), 0) FROM tickets WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sum)
    }
}
