use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts;
use crate::error::AppError;
use crate::models::customer::CustomerProfile;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", post(register))
        .route(
            "/customers/verify",
            get(verify_via_link).post(verify_via_body),
        )
        .route("/customers/:id", get(get_customer))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<accounts::RegistrationForm>,
) -> Result<Json<CustomerProfile>, AppError> {
    let customer = accounts::register_customer(&state, payload).await?;
    Ok(Json(customer))
}

#[derive(Deserialize)]
pub struct VerifyParams {
    pub token: String,
}

/// Link target from the verification mail.
async fn verify_via_link(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<CustomerProfile>, AppError> {
    let customer = accounts::verify_email(&state, &params.token)?;
    Ok(Json(customer))
}

async fn verify_via_body(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyParams>,
) -> Result<Json<CustomerProfile>, AppError> {
    let customer = accounts::verify_email(&state, &payload.token)?;
    Ok(Json(customer))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerProfile>, AppError> {
    let customer = state
        .customers
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("customer {id} not found")))?;

    Ok(Json(customer.value().clone()))
}
