//! Pickup request lifecycle. Transitions are enforced by the
//! `PickupStatus` transition table; each one writes the new status and its
//! timestamp, appends exactly one history entry, and then emits the matching
//! notification event. Notification delivery is best-effort and never rolls
//! a committed transition back.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::billing::invoice::build_invoice;
use crate::error::AppError;
use crate::models::customer::{is_valid_phone, is_valid_pincode};
use crate::models::pickup::{PickupRequest, PickupStatus, StatusHistoryEntry};
use crate::notify::{queue, Notification};
use crate::state::AppState;

pub const COMPLETED_NOTE: &str = "Marked as completed";

#[derive(Debug, Clone, Deserialize)]
pub struct PickupForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub parcel_description: String,
    pub parcel_weight: String,
    pub estimated_value_paise: Option<i64>,
    pub preferred_pickup_date: NaiveDate,
    pub preferred_pickup_time: NaiveTime,
}

/// Creates a new request in `pending` for a verified customer and emits the
/// submission event (customer confirmation plus staff alert).
pub async fn submit_pickup(
    state: &AppState,
    customer_id: Uuid,
    form: PickupForm,
) -> Result<PickupRequest, AppError> {
    let customer = state
        .customers
        .get(&customer_id)
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id} not found")))?;

    if !customer.email_verified {
        return Err(AppError::EmailNotVerified);
    }
    drop(customer);

    if form.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("full name cannot be empty".to_string()));
    }
    if !is_valid_phone(&form.phone_number) {
        return Err(AppError::BadRequest(
            "phone number must be 10 digits starting with 6-9".to_string(),
        ));
    }
    if !is_valid_pincode(&form.pincode) {
        return Err(AppError::BadRequest("pincode must be 6 digits".to_string()));
    }
    if form.parcel_weight.trim().is_empty() {
        return Err(AppError::BadRequest("parcel weight cannot be empty".to_string()));
    }

    let now = Utc::now();
    let pickup = PickupRequest {
        id: Uuid::new_v4(),
        customer_id,
        full_name: form.full_name,
        email: form.email,
        phone_number: form.phone_number,
        address: form.address,
        city: form.city,
        state: form.state,
        pincode: form.pincode,
        parcel_description: form.parcel_description,
        parcel_weight: form.parcel_weight,
        estimated_value_paise: form.estimated_value_paise,
        preferred_pickup_date: form.preferred_pickup_date,
        preferred_pickup_time: form.preferred_pickup_time,
        status: PickupStatus::Pending,
        admin_notes: None,
        requested_at: now,
        reviewed_at: None,
        completed_at: None,
        updated_at: now,
    };

    state.pickups.insert(pickup.id, pickup.clone());
    state
        .metrics
        .pickup_requests_total
        .with_label_values(&["pending"])
        .inc();

    info!(pickup_id = %pickup.id, customer_id = %customer_id, "pickup request submitted");
    queue::enqueue(
        state,
        Notification::Submitted {
            pickup: Box::new(pickup.clone()),
        },
    )
    .await;

    Ok(pickup)
}

/// pending -> accepted. Builds (or refreshes) the invoice synchronously,
/// then queues the acceptance mail with the invoice attached.
pub async fn accept_pickup(
    state: &AppState,
    pickup_id: Uuid,
    staff: &str,
    note: Option<String>,
) -> Result<PickupRequest, AppError> {
    let pickup = transition(
        state,
        pickup_id,
        PickupStatus::Accepted,
        staff,
        note.clone(),
        note,
    )?;

    build_invoice(state, &pickup);
    queue::enqueue(state, Notification::Accepted { pickup_id }).await;
    Ok(pickup)
}

/// pending -> rejected. The reason is recorded verbatim on the request and
/// in the history entry.
pub async fn reject_pickup(
    state: &AppState,
    pickup_id: Uuid,
    staff: &str,
    reason: String,
) -> Result<PickupRequest, AppError> {
    let pickup = transition(
        state,
        pickup_id,
        PickupStatus::Rejected,
        staff,
        Some(reason.clone()),
        Some(reason),
    )?;

    queue::enqueue(state, Notification::Rejected { pickup_id }).await;
    Ok(pickup)
}

/// accepted -> completed. Terminal; no notification is sent.
pub fn complete_pickup(
    state: &AppState,
    pickup_id: Uuid,
    staff: &str,
) -> Result<PickupRequest, AppError> {
    transition(
        state,
        pickup_id,
        PickupStatus::Completed,
        staff,
        Some(COMPLETED_NOTE.to_string()),
        None,
    )
}

fn transition(
    state: &AppState,
    pickup_id: Uuid,
    new_status: PickupStatus,
    staff: &str,
    history_note: Option<String>,
    admin_notes: Option<String>,
) -> Result<PickupRequest, AppError> {
    let mut pickup = state
        .pickups
        .get_mut(&pickup_id)
        .ok_or_else(|| AppError::NotFound(format!("pickup request {pickup_id} not found")))?;

    let old_status = pickup.status;
    if !old_status.can_transition_to(new_status) {
        return Err(AppError::InvalidTransition {
            from: old_status,
            to: new_status,
        });
    }

    let now = Utc::now();
    pickup.status = new_status;
    pickup.updated_at = now;
    match new_status {
        PickupStatus::Accepted | PickupStatus::Rejected => pickup.reviewed_at = Some(now),
        PickupStatus::Completed => pickup.completed_at = Some(now),
        PickupStatus::Pending => {}
    }
    if admin_notes.is_some() {
        pickup.admin_notes = admin_notes;
    }

    let entry = StatusHistoryEntry {
        id: Uuid::new_v4(),
        pickup_request_id: pickup_id,
        old_status,
        new_status,
        changed_by: staff.to_string(),
        note: history_note,
        changed_at: now,
    };
    state.history.insert(entry.id, entry);

    state
        .metrics
        .pickup_requests_total
        .with_label_values(&[new_status.as_str()])
        .inc();

    info!(
        pickup_id = %pickup_id,
        from = %old_status,
        to = %new_status,
        staff,
        "pickup request transitioned"
    );

    Ok(pickup.clone())
}
