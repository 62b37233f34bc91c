use tracing::warn;

use crate::notify::Notification;
use crate::state::AppState;

/// Best-effort enqueue: a committed state change must never wait on, or be
/// rolled back because of, the notification channel. A full or closed queue
/// drops the event with a warning.
pub async fn enqueue(state: &AppState, notification: Notification) {
    let kind = notification.kind();
    match state.notify_tx.try_send(notification) {
        Ok(()) => {
            state.metrics.notifications_in_queue.inc();
        }
        Err(err) => {
            warn!(kind, error = %err, "notification queue send failed; dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::enqueue;
    use crate::config::Config;
    use crate::notify::mailer::Mailer;
    use crate::notify::Notification;
    use crate::state::AppState;

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let config = Config {
            notify_queue_size: 1,
            ..Config::default()
        };
        let (state, _rx) = AppState::new(config, Mailer::Log);

        for _ in 0..3 {
            enqueue(
                &state,
                Notification::Welcome {
                    customer_id: Uuid::new_v4(),
                },
            )
            .await;
        }

        // only the one queued event counted; the rest were dropped
        assert_eq!(state.metrics.notifications_in_queue.get(), 1);
    }
}
