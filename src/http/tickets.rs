use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::context::AppContext;
use crate::domain::ticket::{
    AssigneeRequest, CreateTicketRequest, EditTicketRequest, PerformanceResponse, StatusRequest,
    SummaryRow, TicketDetailResponse, TicketResponse,
};
use crate::error::AppResult;
use crate::http::{CallerEmail, DataResponse, MessageResponse};
use crate::workflow::ticket as workflow;

pub async fn create_ticket(
    State(ctx): State<AppContext>,
    Extension(CallerEmail(email)): Extension<CallerEmail>,
    Json(request): Json<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    workflow::create_ticket(&ctx, request, &email).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Ticket created".to_string(),
            status: 201,
        }),
    ))
}

pub async fn list_tickets(
    State(ctx): State<AppContext>,
) -> AppResult<Json<DataResponse<Vec<TicketResponse>>>> {
    let tickets = workflow::list_tickets(&ctx).await?;
    Ok(Json(DataResponse::success(tickets)))
}

pub async fn ticket_detail(
    State(ctx): State<AppContext>,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<TicketDetailResponse>>> {
    let detail = workflow::ticket_detail(&ctx, ticket_id).await?;
    Ok(Json(DataResponse::success(detail)))
}

pub async fn update_assignee(
    State(ctx): State<AppContext>,
    Path(ticket_id): Path<Uuid>,
    Extension(CallerEmail(email)): Extension<CallerEmail>,
    Json(request): Json<AssigneeRequest>,
) -> AppResult<Json<MessageResponse>> {
    workflow::reassign_ticket(&ctx, &request.email, ticket_id, &email).await?;
    Ok(Json(MessageResponse {
        message: "Ticket updated".to_string(),
        status: 200,
    }))
}

pub async fn edit_ticket(
    State(ctx): State<AppContext>,
    Path(ticket_id): Path<Uuid>,
    Extension(CallerEmail(email)): Extension<CallerEmail>,
    Json(request): Json<EditTicketRequest>,
) -> AppResult<Json<MessageResponse>> {
    workflow::edit_ticket(&ctx, ticket_id, &email, request).await?;
    Ok(Json(MessageResponse {
        message: "Ticket updated".to_string(),
        status: 200,
    }))
}

pub async fn update_status(
    State(ctx): State<AppContext>,
    Path(ticket_id): Path<Uuid>,
    Extension(CallerEmail(email)): Extension<CallerEmail>,
    Json(request): Json<StatusRequest>,
) -> AppResult<Json<MessageResponse>> {
    workflow::change_status(&ctx, ticket_id, &email, &request.status).await?;
    Ok(Json(MessageResponse {
        message: "Ticket updated".to_string(),
        status: 200,
    }))
}

pub async fn summary(
    State(ctx): State<AppContext>,
    Extension(CallerEmail(email)): Extension<CallerEmail>,
) -> AppResult<Json<DataResponse<Vec<SummaryRow>>>> {
    let rows = workflow::summary(&ctx, &email).await?;
    Ok(Json(DataResponse::success(rows)))
}

pub async fn performance(
    State(ctx): State<AppContext>,
    Extension(CallerEmail(email)): Extension<CallerEmail>,
) -> AppResult<Json<DataResponse<PerformanceResponse>>> {
    let report = workflow::performance(&ctx, &email).await?;
    Ok(Json(DataResponse::success(report)))
}
