//! Notification consumer. Mirrors the request lifecycle from the other side
//! of the mpsc queue: events are composed into mail and sent, re-reading
//! current state where the mail must reflect it. Every failure here is
//! logged and counted, never propagated back to the flow that emitted the
//! event.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::billing::pdf::render_invoice_pdf;
use crate::error::AppError;
use crate::notify::mailer::{EmailAttachment, OutboundEmail};
use crate::notify::{templates, Notification};
use crate::state::AppState;

pub async fn run_notification_dispatcher(
    state: Arc<AppState>,
    mut notify_rx: mpsc::Receiver<Notification>,
) {
    info!("notification dispatcher started");

    while let Some(event) = notify_rx.recv().await {
        state.metrics.notifications_in_queue.dec();

        let start = Instant::now();
        let outcome = match process_notification(&state, event).await {
            Ok(()) => "success",
            Err(err) => {
                error!(error = %err, "failed to process notification event");
                "error"
            }
        };

        state
            .metrics
            .notification_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
    }

    warn!("notification dispatcher stopped: queue channel closed");
}

async fn process_notification(state: &AppState, event: Notification) -> Result<(), AppError> {
    let kind = event.kind();
    match event {
        Notification::Submitted { pickup } => {
            let (subject, body) = templates::submission_confirmation(&pickup);
            send_logged(state, kind, pickup.email.clone(), subject, body, None).await;

            if state.config.admin_emails.is_empty() {
                warn!(pickup_id = %pickup.id, "no staff recipients configured; skipping alert");
                return Ok(());
            }
            let (subject, body) = templates::admin_alert(&pickup);
            for recipient in &state.config.admin_emails {
                send_logged(
                    state,
                    "admin_alert",
                    recipient.clone(),
                    subject.clone(),
                    body.clone(),
                    None,
                )
                .await;
            }
        }
        Notification::Accepted { pickup_id } => {
            let pickup = load_pickup(state, pickup_id)?;
            let invoice = state
                .invoices
                .get(&pickup_id)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| {
                    AppError::Internal(format!("no invoice for accepted pickup {pickup_id}"))
                })?;

            let (subject, body) = templates::acceptance_notice(&pickup, &invoice);

            // Two-tier fallback: a failed render downgrades to the plain
            // acceptance text instead of failing the notification.
            let attachment = match render_invoice_pdf(&pickup, &invoice, Utc::now()) {
                Ok(bytes) => Some(EmailAttachment {
                    filename: format!("Invoice_Request_{pickup_id}.pdf"),
                    content_type: "application/pdf".to_string(),
                    bytes,
                }),
                Err(err) => {
                    warn!(
                        pickup_id = %pickup_id,
                        error = %err,
                        "invoice render failed; sending acceptance without attachment"
                    );
                    None
                }
            };

            send_logged(state, kind, pickup.email.clone(), subject, body, attachment).await;
        }
        Notification::Rejected { pickup_id } => {
            let pickup = load_pickup(state, pickup_id)?;
            let (subject, body) = templates::rejection_notice(&pickup);
            send_logged(state, kind, pickup.email.clone(), subject, body, None).await;
        }
        Notification::Welcome { customer_id } => {
            let customer = load_customer(state, customer_id)?;
            let (subject, body) = templates::welcome(&customer);
            send_logged(state, kind, customer.email.clone(), subject, body, None).await;
        }
        Notification::VerifyEmail { customer_id, token } => {
            let customer = load_customer(state, customer_id)?;
            let (subject, body) =
                templates::verify_email(&customer, &token, &state.config.public_base_url);
            send_logged(state, kind, customer.email.clone(), subject, body, None).await;
        }
    }

    Ok(())
}

/// One best-effort send: failures are logged and counted, nothing more.
async fn send_logged(
    state: &AppState,
    kind: &str,
    to: String,
    subject: String,
    body: String,
    attachment: Option<EmailAttachment>,
) {
    let mail = OutboundEmail {
        to: to.clone(),
        subject,
        body,
        attachment,
    };

    match state.mailer.send(mail).await {
        Ok(()) => {
            state
                .metrics
                .emails_total
                .with_label_values(&[kind, "success"])
                .inc();
            info!(kind, to = %to, "email sent");
        }
        Err(err) => {
            state
                .metrics
                .emails_total
                .with_label_values(&[kind, "error"])
                .inc();
            warn!(kind, to = %to, error = %err, "email send failed");
        }
    }
}

fn load_pickup(
    state: &AppState,
    pickup_id: Uuid,
) -> Result<crate::models::pickup::PickupRequest, AppError> {
    state
        .pickups
        .get(&pickup_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("pickup request {pickup_id} not found")))
}

fn load_customer(
    state: &AppState,
    customer_id: Uuid,
) -> Result<crate::models::customer::CustomerProfile, AppError> {
    state
        .customers
        .get(&customer_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id} not found")))
}
