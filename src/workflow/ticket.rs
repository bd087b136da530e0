use chrono::Utc;
use uuid::Uuid;

use crate::context::AppContext;
use crate::domain::ticket::{
    CreateTicketRequest, EditTicketRequest, HistoryEntry, HistoryView, PerformanceResponse,
    SummaryRow, Ticket, TicketDetailResponse, TicketResponse,
};
use crate::error::{AppError, AppResult};
use crate::services::{StatusCount, StatusPointSum};

/// Resolve the caller, then persist the new ticket and its "Ticket Created"
/// entry as one atomic unit. The directory lookup runs before the write, so a
/// directory failure prevents any store mutation.
pub async fn create_ticket(
    ctx: &AppContext,
    request: CreateTicketRequest,
    caller_email: &str,
) -> AppResult<()> {
    request.validate()?;
    let caller = ctx.directory.get_user_by_email(caller_email).await?;

    let now = Utc::now();
    let ticket = Ticket {
        id: Uuid::new_v4(),
        user_id: caller.id,
        title: request.title,
        description: request.description,
        status: request.status,
        point: request.point,
        created_at: now,
        updated_at: now,
    };
    let history = HistoryEntry::new(ticket.id, "Ticket Created".to_string(), caller.name);

    ctx.store.create_ticket(ticket, history).await
}

/// One directory lookup per ticket; a failed lookup aborts the whole listing.
pub async fn list_tickets(ctx: &AppContext) -> AppResult<Vec<TicketResponse>> {
    let tickets = ctx.store.get_all_tickets().await?;

    let mut responses = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let owner = ctx.directory.get_user_by_user_id(&ticket.user_id).await?;
        responses.push(TicketResponse {
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            status: ticket.status,
            point: ticket.point,
            user: owner.name,
            profile_pic: owner.profile_pic,
        });
    }

    Ok(responses)
}

pub async fn ticket_detail(ctx: &AppContext, ticket_id: Uuid) -> AppResult<TicketDetailResponse> {
    let ticket = ctx.store.get_ticket_by_id(ticket_id).await?;
    let owner = ctx.directory.get_user_by_user_id(&ticket.user_id).await?;
    let history = ctx.store.get_history_by_ticket_id(ticket_id).await?;

    Ok(TicketDetailResponse {
        id: ticket.id,
        username: owner.name,
        profile_pic: owner.profile_pic,
        title: ticket.title,
        description: ticket.description,
        status: ticket.status,
        point: ticket.point,
        history: history
            .into_iter()
            .map(|entry| HistoryView {
                date: entry.date,
                title: entry.title,
                user: entry.user,
            })
            .collect(),
    })
}

pub async fn reassign_ticket(
    ctx: &AppContext,
    assignee_email: &str,
    ticket_id: Uuid,
    caller_email: &str,
) -> AppResult<()> {
    if !assignee_email.contains('@') {
        return Err(AppError::Validation(
            "assignee email is not a valid address".to_string(),
        ));
    }

    let assignee = ctx.directory.get_user_by_email(assignee_email).await?;
    let caller = ctx.directory.get_user_by_email(caller_email).await?;

    let history = HistoryEntry::new(
        ticket_id,
        format!("Change Assignees to {}", assignee.name),
        caller.name,
    );

    ctx.store
        .reassign_owner(&assignee.id, ticket_id, history)
        .await
}

pub async fn edit_ticket(
    ctx: &AppContext,
    ticket_id: Uuid,
    caller_email: &str,
    edits: EditTicketRequest,
) -> AppResult<()> {
    edits.validate()?;
    let caller = ctx.directory.get_user_by_email(caller_email).await?;

    let history = HistoryEntry::new(
        ticket_id,
        format!("Edited by {}", caller.name),
        caller.name.clone(),
    );

    ctx.store.edit_ticket(edits, ticket_id, history).await
}

pub async fn change_status(
    ctx: &AppContext,
    ticket_id: Uuid,
    caller_email: &str,
    status: &str,
) -> AppResult<()> {
    if status.trim().is_empty() {
        return Err(AppError::Validation("status must not be empty".to_string()));
    }
    let caller = ctx.directory.get_user_by_email(caller_email).await?;

    let history = HistoryEntry::new(
        ticket_id,
        format!("{} Change status to {}", caller.name, status),
        caller.name.clone(),
    );

    ctx.store.change_status(status, ticket_id, history).await
}

pub async fn summary(ctx: &AppContext, caller_email: &str) -> AppResult<Vec<SummaryRow>> {
    let caller = ctx.directory.get_user_by_email(caller_email).await?;
    let counts = ctx.store.count_by_status(&caller.id).await?;
    let sums = ctx.store.sum_points_by_status(&caller.id).await?;
    Ok(merge_summary(counts, sums))
}

/// Count-grouped rows are the base list; a status present only in the
/// sum-grouped set is dropped.
fn merge_summary(counts: Vec<StatusCount>, sums: Vec<StatusPointSum>) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = counts
        .into_iter()
        .map(|entry| SummaryRow {
            status: entry.status,
            total_task: entry.count,
            point: 0,
        })
        .collect();

    for sum in sums {
        if let Some(row) = rows.iter_mut().find(|row| row.status == sum.status) {
            row.point = sum.point;
        }
    }

    rows
}

pub async fn performance(ctx: &AppContext, caller_email: &str) -> AppResult<PerformanceResponse> {
    let caller = ctx.directory.get_user_by_email(caller_email).await?;

    let total_task = ctx.store.count_total(&caller.id).await?;
    let completed_task = ctx.store.count_done(&caller.id).await?;
    let total_point = ctx.store.sum_points_total(&caller.id).await?;
    let completed_point = ctx.store.sum_points_done(&caller.id).await?;

    Ok(build_performance(
        total_task,
        completed_task,
        total_point,
        completed_point,
    ))
}

fn build_performance(
    total_task: i64,
    completed_task: i64,
    total_point: i64,
    completed_point: i64,
) -> PerformanceResponse {
    PerformanceResponse {
        total_task,
        completed_task,
        uncompleted_task: total_task - completed_task,
        total_point,
        completed_point,
        uncompleted_point: total_point - completed_point,
        task_percentage: percentage(completed_task, total_task),
        point_percentage: percentage(completed_point, total_point),
    }
}

/// A zero denominator reports "0%" rather than failing.
fn percentage(part: i64, total: i64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    let value = part as f64 / total as f64 * 100.0;
    format!("{}%", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StubDirectory, test_context};

    fn create_request(title: &str, status: &str, point: i64) -> CreateTicketRequest {
        CreateTicketRequest {
            title: title.to_string(),
            description: "Build the login form".to_string(),
            status: status.to_string(),
            point,
        }
    }

    #[tokio::test]
    async fn create_then_detail_roundtrip() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "alice@example.com",
        )
        .await
        .unwrap();

        let tickets = ctx.store.get_all_tickets().await.unwrap();
        assert_eq!(tickets.len(), 1);

        let detail = ticket_detail(&ctx, tickets[0].id).await.unwrap();
        assert_eq!(detail.title, "Add login page");
        assert_eq!(detail.description, "Build the login form");
        assert_eq!(detail.point, 3);
        assert_eq!(detail.username, "Alice");
        assert_eq!(detail.history.len(), 1);
        assert_eq!(detail.history[0].title, "Ticket Created");
        assert_eq!(detail.history[0].user, "Alice");
    }

    #[tokio::test]
    async fn create_rejects_invalid_request_before_any_lookup() {
        let ctx = test_context(StubDirectory::default()).await;
        let err = create_ticket(&ctx, create_request("", "open", 3), "alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn directory_failure_prevents_any_write() {
        let ctx = test_context(StubDirectory::default()).await;
        let err = create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "nobody@example.com",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Directory(_)));
        assert!(ctx.store.get_all_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_resolves_each_owner() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "alice@example.com",
        )
        .await
        .unwrap();

        let listing = list_tickets(&ctx).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].user, "Alice");
        assert_eq!(listing[0].profile_pic, "https://pics.test/u-alice.png");
    }

    #[tokio::test]
    async fn listing_aborts_when_an_owner_lookup_fails() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "alice@example.com",
        )
        .await
        .unwrap();

        // Swap the context's directory for one that no longer knows the
        // owner; the already-read tickets are discarded.
        let empty = test_context(StubDirectory::default()).await;
        let ctx = AppContext::new(ctx.config.clone(), ctx.store.clone(), empty.directory);
        let err = list_tickets(&ctx).await.unwrap_err();
        assert!(matches!(err, AppError::Directory(_)));
    }

    #[tokio::test]
    async fn reassignment_history_names_assignee_and_caller() {
        let directory = StubDirectory::default()
            .with_user("alice@example.com", "u-alice", "Alice")
            .with_user("bob@example.com", "u-bob", "Bob")
            .with_user("carol@example.com", "u-carol", "Carol");
        let ctx = test_context(directory).await;

        create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "alice@example.com",
        )
        .await
        .unwrap();
        let ticket_id = ctx.store.get_all_tickets().await.unwrap()[0].id;

        reassign_ticket(&ctx, "bob@example.com", ticket_id, "carol@example.com")
            .await
            .unwrap();

        let ticket = ctx.store.get_ticket_by_id(ticket_id).await.unwrap();
        assert_eq!(ticket.user_id, "u-bob");

        let history = ctx.store.get_history_by_ticket_id(ticket_id).await.unwrap();
        assert_eq!(history.len(), 2);
        let entry = history
            .iter()
            .find(|entry| entry.title.contains("Change Assignees"))
            .unwrap();
        assert_eq!(entry.title, "Change Assignees to Bob");
        assert_eq!(entry.user, "Carol");
    }

    #[tokio::test]
    async fn reassignment_rejects_malformed_email() {
        let ctx = test_context(StubDirectory::default()).await;
        let err = reassign_ticket(&ctx, "not-an-email", Uuid::new_v4(), "alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn edit_is_attributed_to_the_caller() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "alice@example.com",
        )
        .await
        .unwrap();
        let ticket_id = ctx.store.get_all_tickets().await.unwrap()[0].id;

        edit_ticket(
            &ctx,
            ticket_id,
            "alice@example.com",
            EditTicketRequest {
                title: "Add login and logout".to_string(),
                description: "Expanded scope".to_string(),
                point: 8,
            },
        )
        .await
        .unwrap();

        let history = ctx.store.get_history_by_ticket_id(ticket_id).await.unwrap();
        assert!(
            history
                .iter()
                .any(|entry| entry.title == "Edited by Alice" && entry.user == "Alice")
        );
    }

    #[tokio::test]
    async fn status_change_history_names_caller_and_status() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        create_ticket(
            &ctx,
            create_request("Add login page", "open", 3),
            "alice@example.com",
        )
        .await
        .unwrap();
        let ticket_id = ctx.store.get_all_tickets().await.unwrap()[0].id;

        change_status(&ctx, ticket_id, "alice@example.com", "done")
            .await
            .unwrap();

        let ticket = ctx.store.get_ticket_by_id(ticket_id).await.unwrap();
        assert_eq!(ticket.status, "done");
        let history = ctx.store.get_history_by_ticket_id(ticket_id).await.unwrap();
        assert!(
            history
                .iter()
                .any(|entry| entry.title == "Alice Change status to done")
        );
    }

    #[test]
    fn summary_merge_keeps_count_rows_and_fills_points() {
        let counts = vec![
            StatusCount {
                status: "open".to_string(),
                count: 3,
            },
            StatusCount {
                status: "done".to_string(),
                count: 2,
            },
        ];
        let sums = vec![StatusPointSum {
            status: "done".to_string(),
            point: 10,
        }];

        let merged = merge_summary(counts, sums);
        assert_eq!(
            merged,
            vec![
                SummaryRow {
                    status: "open".to_string(),
                    total_task: 3,
                    point: 0,
                },
                SummaryRow {
                    status: "done".to_string(),
                    total_task: 2,
                    point: 10,
                },
            ]
        );
    }

    #[test]
    fn summary_merge_drops_sum_only_statuses() {
        let counts = vec![StatusCount {
            status: "open".to_string(),
            count: 1,
        }];
        let sums = vec![
            StatusPointSum {
                status: "open".to_string(),
                point: 2,
            },
            StatusPointSum {
                status: "orphaned".to_string(),
                point: 9,
            },
        ];

        let merged = merge_summary(counts, sums);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].status, "open");
        assert_eq!(merged[0].point, 2);
    }

    #[tokio::test]
    async fn summary_reflects_the_callers_tickets() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        for (status, point) in [("open", 1), ("open", 2), ("done", 4)] {
            create_ticket(
                &ctx,
                create_request("Add login page", status, point),
                "alice@example.com",
            )
            .await
            .unwrap();
        }

        let mut rows = summary(&ctx, "alice@example.com").await.unwrap();
        rows.sort_by(|a, b| a.status.cmp(&b.status));
        assert_eq!(
            rows,
            vec![
                SummaryRow {
                    status: "done".to_string(),
                    total_task: 1,
                    point: 4,
                },
                SummaryRow {
                    status: "open".to_string(),
                    total_task: 2,
                    point: 3,
                },
            ]
        );
    }

    #[test]
    fn performance_percentages_from_counts_and_points() {
        let report = build_performance(4, 2, 10, 4);
        assert_eq!(report.total_task, 4);
        assert_eq!(report.completed_task, 2);
        assert_eq!(report.uncompleted_task, 2);
        assert_eq!(report.total_point, 10);
        assert_eq!(report.completed_point, 4);
        assert_eq!(report.uncompleted_point, 6);
        assert_eq!(report.task_percentage, "50%");
        assert_eq!(report.point_percentage, "40%");
    }

    #[test]
    fn performance_with_zero_totals_reports_zero_percent() {
        let report = build_performance(0, 0, 0, 0);
        assert_eq!(report.task_percentage, "0%");
        assert_eq!(report.point_percentage, "0%");
    }

    #[tokio::test]
    async fn performance_end_to_end() {
        let directory = StubDirectory::default().with_user("alice@example.com", "u-alice", "Alice");
        let ctx = test_context(directory).await;

        for (status, point) in [("done", 1), ("done", 3), ("open", 2), ("open", 4)] {
            create_ticket(
                &ctx,
                create_request("Add login page", status, point),
                "alice@example.com",
            )
            .await
            .unwrap();
        }

        let report = performance(&ctx, "alice@example.com").await.unwrap();
        assert_eq!(report.total_task, 4);
        assert_eq!(report.completed_task, 2);
        assert_eq!(report.total_point, 10);
        assert_eq!(report.completed_point, 4);
        assert_eq!(report.task_percentage, "50%");
        assert_eq!(report.point_percentage, "40%");
    }
}
