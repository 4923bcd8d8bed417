//! # REST API for Payments
//!
//! Endpoints for recording, correcting, and listing member payments.
//! Validation failures come back as 400 with the accumulated messages;
//! the residual uniqueness race surfaces as 409.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::PaymentError;
use crate::AppState;
use shared::{CreatePaymentRequest, UpdatePaymentRequest};

// Query parameters for payment listing
#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub month_id: Option<i64>,
    pub member_id: Option<i64>,
}

fn payment_error_response(e: PaymentError) -> axum::response::Response {
    match e {
        PaymentError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        PaymentError::MemberNotFound(_)
        | PaymentError::MonthNotFound(_)
        | PaymentError::PaymentNotFound(_) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        PaymentError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()).into_response(),
        PaymentError::Storage(err) => {
            error!("Payment storage failure: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error saving payment").into_response()
        }
    }
}

/// List payments, optionally narrowed to one month or one member
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> impl IntoResponse {
    info!("GET /api/payments - query: {:?}", query);

    let result = match (query.month_id, query.member_id) {
        (Some(month_id), _) => state.payment_service.payments_for_month(month_id).await,
        (None, Some(member_id)) => state.payment_service.payments_for_member(member_id).await,
        (None, None) => state.payment_service.list_payments().await,
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list payments: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing payments").into_response()
        }
    }
}

/// Record a new payment
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/payments - request: {:?}", request);

    match state.payment_service.create_payment(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => payment_error_response(e),
    }
}

/// Correct an existing payment
pub async fn update_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
    Json(request): Json<UpdatePaymentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/payments/{} - request: {:?}", payment_id, request);

    match state.payment_service.update_payment(payment_id, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => payment_error_response(e),
    }
}

/// Delete a payment record
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/payments/{}", payment_id);

    match state.payment_service.delete_payment(payment_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => payment_error_response(e),
    }
}
