use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::pickup::{PickupRequest, StatusHistoryEntry};
use crate::state::AppState;
use crate::workflow::{self, PickupForm};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pickups", post(submit_pickup).get(list_pickups))
        .route("/pickups/:id", get(get_pickup))
        .route("/pickups/:id/invoice", get(download_invoice))
}

#[derive(Deserialize)]
pub struct SubmitPickupRequest {
    pub customer_id: Uuid,
    #[serde(flatten)]
    pub form: PickupForm,
}

async fn submit_pickup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitPickupRequest>,
) -> Result<Json<PickupRequest>, AppError> {
    let pickup = workflow::submit_pickup(&state, payload.customer_id, payload.form).await?;
    Ok(Json(pickup))
}

#[derive(Deserialize)]
pub struct ListParams {
    pub customer_id: Uuid,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Serialize)]
pub struct PickupPage {
    pub items: Vec<PickupRequest>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

/// A customer's request history, newest first.
async fn list_pickups(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<PickupPage> {
    let mut items: Vec<PickupRequest> = state
        .pickups
        .iter()
        .filter(|entry| entry.value().customer_id == params.customer_id)
        .map(|entry| entry.value().clone())
        .collect();
    items.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(10).clamp(1, 100);
    let total = items.len();
    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Json(PickupPage {
        items,
        page,
        per_page,
        total,
    })
}

#[derive(Serialize)]
pub struct PickupDetail {
    #[serde(flatten)]
    pub pickup: PickupRequest,
    pub status_history: Vec<StatusHistoryEntry>,
}

async fn get_pickup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PickupDetail>, AppError> {
    let pickup = state
        .pickups
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("pickup request {id} not found")))?;

    Ok(Json(PickupDetail {
        pickup,
        status_history: state.history_for(id),
    }))
}

/// Renders the stored invoice to PDF for direct download. 404 until the
/// request has been accepted.
async fn download_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pickup = state
        .pickups
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("pickup request {id} not found")))?;

    let invoice = state
        .invoices
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("no invoice for pickup request {id}")))?;

    let bytes = crate::billing::pdf::render_invoice_pdf(&pickup, &invoice, chrono::Utc::now())?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.pdf\"", invoice.invoice_number),
            ),
        ],
        bytes,
    ))
}
