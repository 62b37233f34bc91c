pub mod dispatcher;
pub mod mailer;
pub mod queue;
pub mod templates;

use uuid::Uuid;

use crate::models::pickup::PickupRequest;

/// Domain events emitted by the core flows. The dispatcher turns these into
/// outbound mail. Submission carries the request as it looked when it was
/// submitted, so the confirmation reflects that moment; the other events
/// carry ids and are re-read from state when processed.
#[derive(Debug, Clone)]
pub enum Notification {
    Submitted { pickup: Box<PickupRequest> },
    Accepted { pickup_id: Uuid },
    Rejected { pickup_id: Uuid },
    Welcome { customer_id: Uuid },
    VerifyEmail { customer_id: Uuid, token: String },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Submitted { .. } => "submitted",
            Notification::Accepted { .. } => "accepted",
            Notification::Rejected { .. } => "rejected",
            Notification::Welcome { .. } => "welcome",
            Notification::VerifyEmail { .. } => "verify_email",
        }
    }
}
