pub mod tickets;

use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::error::AppError;

/// The caller's email, taken verbatim from the Authorization header. This is
/// an identification mechanism, not authentication: the value is not a
/// verified credential.
#[derive(Debug, Clone)]
pub struct CallerEmail(pub String);

pub fn build_router(context: AppContext) -> Router {
    let api = Router::new()
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/create", post(tickets::create_ticket))
        .route("/tickets/:ticket_id", get(tickets::ticket_detail))
        .route("/tickets/:ticket_id/assignee", put(tickets::update_assignee))
        .route("/tickets/:ticket_id/edit", put(tickets::edit_ticket))
        .route("/tickets/:ticket_id/status", put(tickets::update_status))
        .route("/summary", get(tickets::summary))
        .route("/performance", get(tickets::performance))
        .layer(middleware::from_fn(caller_identity));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(context)
}

async fn caller_identity(mut request: Request, next: Next) -> Response {
    let email = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    request.extensions_mut().insert(CallerEmail(email));
    next.run(request).await
}

async fn health() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "ok".to_string(),
        status: 200,
    })
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub status: u16,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub status: u16,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: "Success".to_string(),
            status: 200,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
    status: u16,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            message,
            status: status.as_u16(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
