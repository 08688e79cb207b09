//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every failure goes through [`status_for`], the single mapping from
//! [`LeadError`] to an HTTP status.

use super::{
    AppState,
    types::{
        CreateLeadRequest, HealthResponse, LeadListResponse, LeadResponse, ListQuery,
        SaleResponse, StageUpdateRequest, StatusResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use leadflow_core::{LeadError, LeadId};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP status for a core error.
pub fn status_for(err: &LeadError) -> StatusCode {
    match err {
        LeadError::NotFound(_) => StatusCode::NOT_FOUND,
        LeadError::InvalidTransition { .. }
        | LeadError::UnknownValue { .. }
        | LeadError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LeadError::CannotTransfer(_) | LeadError::SaleExists(_) => StatusCode::CONFLICT,
        LeadError::SerializationError(_) | LeadError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Log a failed operation at a level matching its status class.
fn log_failure(operation: &'static str, err: &LeadError) -> StatusCode {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(operation, status = status.as_u16(), error = %err, "Request failed");
    } else {
        tracing::debug!(operation, status = status.as_u16(), error = %err, "Request rejected");
    }
    status
}

// =============================================================================
// HEALTH & STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Per-stage lead counts and total sales.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.service.read().await;
    match service.stats() {
        Ok(stats) => Ok((
            StatusCode::OK,
            Json(StatusResponse::from_stats(&stats, service.is_persistent())),
        )),
        Err(e) => {
            let status = log_failure("status", &e);
            Err((status, Json(LeadResponse::error(e.to_string()))))
        }
    }
}

// =============================================================================
// LEAD HANDLERS
// =============================================================================

/// Create a lead.
pub async fn create_lead_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateLeadRequest>,
) -> impl IntoResponse {
    let new = match request.to_new_lead() {
        Ok(new) => new,
        Err(e) => {
            let status = log_failure("create", &e);
            return (status, Json(LeadResponse::error(e.to_string())));
        }
    };

    let mut service = state.service.write().await;
    match service.create(new) {
        Ok(lead) => {
            tracing::info!(
                lead_id = lead.id.0,
                source = %lead.source,
                "Lead created"
            );
            (StatusCode::CREATED, Json(LeadResponse::success(&lead)))
        }
        Err(e) => {
            let status = log_failure("create", &e);
            (status, Json(LeadResponse::error(e.to_string())))
        }
    }
}

/// List leads, optionally filtered by `?stage=`.
pub async fn list_leads_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let filter = match query.stage_filter() {
        Ok(filter) => filter,
        Err(e) => {
            let status = log_failure("list", &e);
            return (status, Json(LeadListResponse::error(e.to_string())));
        }
    };

    let service = state.service.read().await;
    match service.list(filter) {
        Ok(leads) => (StatusCode::OK, Json(LeadListResponse::success(&leads))),
        Err(e) => {
            let status = log_failure("list", &e);
            (status, Json(LeadListResponse::error(e.to_string())))
        }
    }
}

/// Fetch one lead.
pub async fn get_lead_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let service = state.service.read().await;
    match service.fetch(LeadId(id)) {
        Ok(lead) => (StatusCode::OK, Json(LeadResponse::success(&lead))),
        Err(e) => {
            let status = log_failure("fetch", &e);
            (status, Json(LeadResponse::error(e.to_string())))
        }
    }
}

/// Move a lead to another stage.
pub async fn update_stage_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<StageUpdateRequest>,
) -> impl IntoResponse {
    let target = match request.target() {
        Ok(target) => target,
        Err(e) => {
            let status = log_failure("update_stage", &e);
            return (status, Json(LeadResponse::error(e.to_string())));
        }
    };

    let mut service = state.service.write().await;
    match service.update_stage(LeadId(id), target) {
        Ok(lead) => {
            tracing::info!(lead_id = id, stage = %lead.stage, "Lead stage changed");
            (StatusCode::OK, Json(LeadResponse::success(&lead)))
        }
        Err(e) => {
            if let LeadError::InvalidTransition { current, requested } = &e {
                tracing::info!(
                    lead_id = id,
                    from = %current,
                    to = %requested,
                    "Stage transition rejected"
                );
            }
            let status = log_failure("update_stage", &e);
            (status, Json(LeadResponse::error(e.to_string())))
        }
    }
}

/// Score a lead and store the result.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut service = state.service.write().await;
    match service.analyze(LeadId(id)) {
        Ok(lead) => {
            tracing::info!(
                lead_id = id,
                score = ?lead.ai_score.map(|s| s.hundredths()),
                recommendation = ?lead.ai_recommendation,
                "Lead analyzed"
            );
            (StatusCode::OK, Json(LeadResponse::success(&lead)))
        }
        Err(e) => {
            let status = log_failure("analyze", &e);
            (status, Json(LeadResponse::error(e.to_string())))
        }
    }
}

/// Record one activity on a lead.
pub async fn activity_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut service = state.service.write().await;
    match service.record_activity(LeadId(id)) {
        Ok(lead) => {
            tracing::debug!(
                lead_id = id,
                activity_count = lead.activity_count,
                "Activity recorded"
            );
            (StatusCode::OK, Json(LeadResponse::success(&lead)))
        }
        Err(e) => {
            let status = log_failure("activity", &e);
            (status, Json(LeadResponse::error(e.to_string())))
        }
    }
}

/// The sale opened for a transferred lead.
pub async fn sale_handler(State(state): State<AppState>, Path(id): Path<u64>) -> impl IntoResponse {
    let service = state.service.read().await;
    match service.sale_for_lead(LeadId(id)) {
        Ok(sale) => (StatusCode::OK, Json(SaleResponse::success(sale.as_ref()))),
        Err(e) => {
            let status = log_failure("sale", &e);
            (status, Json(SaleResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
