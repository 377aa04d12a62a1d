//! Event-to-notification dispatcher.
//!
//! [`NotificationDispatcher`] subscribes to the platform event bus, turns each
//! workflow event back into a [`ProjectNotice`], writes a notification row
//! for the recipient and, for emailed event types, sends a best-effort email.
//! Nothing here can fail the request that published the event.

use roofdesk_db::models::notification::{CreateNotification, Notification};
use roofdesk_db::repositories::NotificationRepo;
use roofdesk_db::DbPool;
use roofdesk_events::{EmailDelivery, PlatformEvent, ProjectNotice};
use tokio::sync::broadcast;

pub struct NotificationDispatcher {
    pool: DbPool,
    /// `None` when SMTP is not configured.
    email: Option<EmailDelivery>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, email: Option<EmailDelivery>) -> Self {
        Self { pool, email }
    }

    /// Run the dispatch loop until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.dispatch(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to write notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Handle one event. Events that carry no notice are ignored.
    ///
    /// Returns the stored notification row. Email failures are logged and
    /// do not turn into an error.
    pub async fn dispatch(
        &self,
        event: &PlatformEvent,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let Some(notice) = ProjectNotice::from_event(event) else {
            return Ok(None);
        };

        let notification = NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                user_id: notice.to_user,
                notification_type: notice.event_type.clone(),
                title: notice.title(),
                message: notice.message(),
                project_id: Some(notice.project_id),
                project_name: Some(notice.project_name.clone()),
            },
        )
        .await?;

        if notice.wants_email() {
            self.send_email(&notice).await;
        }

        Ok(Some(notification))
    }

    async fn send_email(&self, notice: &ProjectNotice) {
        let (Some(mailer), Some(address)) = (&self.email, notice.email.as_deref()) else {
            tracing::debug!(
                event_type = %notice.event_type,
                to_user = notice.to_user,
                "Email skipped: SMTP not configured or no address"
            );
            return;
        };

        if let Err(e) = mailer.deliver(address, notice).await {
            tracing::warn!(
                error = %e,
                event_type = %notice.event_type,
                to_user = notice.to_user,
                "Failed to send notification email"
            );
        }
    }
}
