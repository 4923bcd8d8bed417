//! # REST API for Members
//!
//! Endpoints for registering members and listing the entry candidate set.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::AppState;
use shared::{CreateMemberRequest, UpdateMemberRequest};

/// List all members
pub async fn list_members(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/members");

    match state.member_service.list_members().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list members: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing members").into_response()
        }
    }
}

/// List members eligible for new payment entry
pub async fn list_active_members(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/members/active");

    match state.member_service.active_members().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to list active members: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing active members").into_response()
        }
    }
}

/// Register a new member
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - request: {:?}", request);

    match state.member_service.create_member(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to create member: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Update a member's details or activity flag
pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
    Json(request): Json<UpdateMemberRequest>,
) -> impl IntoResponse {
    info!("PUT /api/members/{} - request: {:?}", member_id, request);

    match state.member_service.update_member(member_id, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to update member {}: {}", member_id, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Delete a member and, by cascade, their payments
pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/members/{}", member_id);

    match state.member_service.delete_member(member_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete member {}: {}", member_id, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}
