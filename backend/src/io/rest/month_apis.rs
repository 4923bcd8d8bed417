//! # REST API for Contribution Months
//!
//! Endpoints for opening billing periods and managing entry locks.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::domain::MonthError;
use crate::AppState;
use shared::{CreateMonthRequest, SetMonthLockedRequest};

fn month_error_response(e: MonthError) -> axum::response::Response {
    match e {
        MonthError::DuplicateMonth(_) => (StatusCode::CONFLICT, e.to_string()).into_response(),
        MonthError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
        MonthError::Storage(err) => {
            error!("Month storage failure: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error saving contribution month").into_response()
        }
    }
}

/// List all contribution months
pub async fn list_months(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/months");

    match state.month_service.list_months().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list months: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing months").into_response()
        }
    }
}

/// List months still open for payment entry
pub async fn list_open_months(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/months/open");

    match state.month_service.open_months().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list open months: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing open months").into_response()
        }
    }
}

/// Open a new contribution month
pub async fn create_month(
    State(state): State<AppState>,
    Json(request): Json<CreateMonthRequest>,
) -> impl IntoResponse {
    info!("POST /api/months - request: {:?}", request);

    match state.month_service.create_month(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => month_error_response(e),
    }
}

/// Lock or unlock a month for new payment entry
pub async fn set_month_locked(
    State(state): State<AppState>,
    Path(month_id): Path<i64>,
    Json(request): Json<SetMonthLockedRequest>,
) -> impl IntoResponse {
    info!("PUT /api/months/{}/locked - request: {:?}", month_id, request);

    match state.month_service.set_locked(month_id, request.is_locked).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => month_error_response(e),
    }
}

/// Delete a contribution month and, by cascade, its payments
pub async fn delete_month(
    State(state): State<AppState>,
    Path(month_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/months/{}", month_id);

    match state.month_service.delete_month(month_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => month_error_response(e),
    }
}
