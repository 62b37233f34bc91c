use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::customer::CustomerProfile;
use crate::models::invoice::Invoice;
use crate::models::pickup::{PickupRequest, StatusHistoryEntry};
use crate::models::verification::EmailVerificationToken;
use crate::notify::mailer::Mailer;
use crate::notify::Notification;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub customers: DashMap<Uuid, CustomerProfile>,
    pub pickups: DashMap<Uuid, PickupRequest>,
    pub history: DashMap<Uuid, StatusHistoryEntry>,
    /// Keyed by pickup request id; enforces the one-invoice-per-request
    /// invariant.
    pub invoices: DashMap<Uuid, Invoice>,
    pub verification_tokens: DashMap<String, EmailVerificationToken>,
    /// Lowercased email -> customer id, reserved through the entry API so
    /// two concurrent registrations cannot both claim an address.
    pub email_index: DashMap<String, Uuid>,
    /// Per-day invoice sequence, advanced through the entry API so two
    /// same-instant acceptances get distinct numbers.
    pub invoice_day_seq: DashMap<String, u32>,
    pub notify_tx: mpsc::Sender<Notification>,
    pub mailer: Mailer,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, mailer: Mailer) -> (Self, mpsc::Receiver<Notification>) {
        let (notify_tx, notify_rx) = mpsc::channel(config.notify_queue_size);

        (
            Self {
                customers: DashMap::new(),
                pickups: DashMap::new(),
                history: DashMap::new(),
                invoices: DashMap::new(),
                verification_tokens: DashMap::new(),
                email_index: DashMap::new(),
                invoice_day_seq: DashMap::new(),
                notify_tx,
                mailer,
                metrics: Metrics::new(),
                config,
            },
            notify_rx,
        )
    }

    /// History entries for one pickup request, oldest first.
    pub fn history_for(&self, pickup_id: Uuid) -> Vec<StatusHistoryEntry> {
        let mut entries: Vec<StatusHistoryEntry> = self
            .history
            .iter()
            .filter(|entry| entry.value().pickup_request_id == pickup_id)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|e| e.changed_at);
        entries
    }
}
