//! Staff-facing endpoints. Authentication is handled upstream; the acting
//! staff name rides in the payload and ends up in the audit history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::pickup::{PickupRequest, PickupStatus};
use crate::state::AppState;
use crate::workflow;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/pickups", get(dashboard))
        .route("/admin/pickups/:id/accept", post(accept))
        .route("/admin/pickups/:id/reject", post(reject))
        .route("/admin/pickups/:id/complete", post(complete))
}

#[derive(Deserialize)]
pub struct DashboardParams {
    pub status: Option<PickupStatus>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub completed: usize,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub items: Vec<PickupRequest>,
    pub page: usize,
    pub per_page: usize,
    pub total_matches: usize,
}

/// Listing with status filter, free-text search over name/email/phone,
/// pagination and per-status counts.
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Json<DashboardResponse> {
    let all: Vec<PickupRequest> = state
        .pickups
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    let count_with = |status: PickupStatus| all.iter().filter(|p| p.status == status).count();
    let stats = DashboardStats {
        total: all.len(),
        pending: count_with(PickupStatus::Pending),
        accepted: count_with(PickupStatus::Accepted),
        rejected: count_with(PickupStatus::Rejected),
        completed: count_with(PickupStatus::Completed),
    };

    let needle = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<PickupRequest> = all
        .into_iter()
        .filter(|p| params.status.is_none_or(|status| p.status == status))
        .filter(|p| {
            needle.as_deref().is_none_or(|needle| {
                p.full_name.to_lowercase().contains(needle)
                    || p.email.to_lowercase().contains(needle)
                    || p.phone_number.contains(needle)
            })
        })
        .collect();
    matches.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);
    let total_matches = matches.len();
    let items = matches
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Json(DashboardResponse {
        stats,
        items,
        page,
        per_page,
        total_matches,
    })
}

#[derive(Deserialize)]
pub struct AcceptRequest {
    pub staff: String,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub staff: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub staff: String,
}

/// Outcome of a staff action. `notification` reports whether a mail was
/// queued; mail problems surface as dispatcher warnings, never as errors
/// here.
#[derive(Serialize)]
pub struct ActionResponse {
    #[serde(flatten)]
    pub pickup: PickupRequest,
    pub notification: &'static str,
}

async fn accept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    if payload.staff.trim().is_empty() {
        return Err(AppError::BadRequest("staff name cannot be empty".to_string()));
    }

    let pickup = workflow::accept_pickup(&state, id, &payload.staff, payload.note).await?;
    Ok(Json(ActionResponse {
        pickup,
        notification: "queued",
    }))
}

async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    if payload.staff.trim().is_empty() {
        return Err(AppError::BadRequest("staff name cannot be empty".to_string()));
    }

    let reason = payload
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "Not specified".to_string());

    let pickup = workflow::reject_pickup(&state, id, &payload.staff, reason).await?;
    Ok(Json(ActionResponse {
        pickup,
        notification: "queued",
    }))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    if payload.staff.trim().is_empty() {
        return Err(AppError::BadRequest("staff name cannot be empty".to_string()));
    }

    let pickup = workflow::complete_pickup(&state, id, &payload.staff)?;
    Ok(Json(ActionResponse {
        pickup,
        notification: "none",
    }))
}
