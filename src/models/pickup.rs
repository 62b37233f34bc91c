use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PickupStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl PickupStatus {
    /// Transition table for the request lifecycle. Rejected and completed
    /// are terminal.
    pub fn can_transition_to(self, next: PickupStatus) -> bool {
        matches!(
            (self, next),
            (PickupStatus::Pending, PickupStatus::Accepted)
                | (PickupStatus::Pending, PickupStatus::Rejected)
                | (PickupStatus::Accepted, PickupStatus::Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PickupStatus::Rejected | PickupStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Accepted => "accepted",
            PickupStatus::Rejected => "rejected",
            PickupStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's request to have a parcel collected. Monetary fields are
/// integer paise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupRequest {
    pub id: Uuid,
    pub customer_id: Uuid,
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
    pub status: PickupStatus,
    pub admin_notes: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record; exactly one entry per status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub pickup_request_id: Uuid,
    pub old_status: PickupStatus,
    pub new_status: PickupStatus,
    pub changed_by: String,
    pub note: Option<String>,
    pub changed_at: DateTime<Utc>,
}
