//! Workflow notifications carried on the bus.
//!
//! A [`ProjectNotice`] names the project, who acted and who should hear about
//! it. Handlers build one after a successful transition and publish it as a
//! [`PlatformEvent`]; the dispatcher turns it back into a notice and writes a
//! notification row (plus an email for [`EMAIL_EVENTS`]).

use roofdesk_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::bus::PlatformEvent;

pub const PROJECT_SENT_TO_CONTRACTOR: &str = "project.sent_to_contractor";
pub const PROJECT_REVIEW_STARTED: &str = "project.review_started";
pub const PROPOSAL_SENT: &str = "proposal.sent";
pub const PROPOSAL_ACCEPTED: &str = "proposal.accepted";
pub const PROPOSAL_REJECTED: &str = "proposal.rejected";
pub const PROPOSAL_REVISION_REQUESTED: &str = "proposal.revision_requested";
pub const PROJECT_STARTED: &str = "project.started";
pub const PROJECT_COMPLETED: &str = "project.completed";
pub const MATERIALS_RETURNED: &str = "materials.returned";

/// Events that also go out by email when SMTP is configured.
pub const EMAIL_EVENTS: &[&str] = &[PROPOSAL_REJECTED, PROJECT_COMPLETED];

/// Payload of a workflow notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNotice {
    pub event_type: String,
    pub project_id: DbId,
    pub project_name: String,
    pub from_user: DbId,
    pub to_user: DbId,
    /// Recipient address, looked up by the publisher. `None` skips email.
    pub email: Option<String>,
    /// Free text carried along, e.g. a decline reason.
    #[serde(default)]
    pub detail: Option<String>,
}

impl ProjectNotice {
    pub fn new(
        event_type: &str,
        project_id: DbId,
        project_name: impl Into<String>,
        from_user: DbId,
        to_user: DbId,
    ) -> Self {
        Self {
            event_type: event_type.to_string(),
            project_id,
            project_name: project_name.into(),
            from_user,
            to_user,
            email: None,
            detail: None,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Whether this event type is one that is also emailed.
    pub fn wants_email(&self) -> bool {
        EMAIL_EVENTS.contains(&self.event_type.as_str())
    }

    /// Short notification title.
    pub fn title(&self) -> String {
        let title = match self.event_type.as_str() {
            PROJECT_SENT_TO_CONTRACTOR => "New quote request",
            PROJECT_REVIEW_STARTED => "Contractor is reviewing your project",
            PROPOSAL_SENT => "Proposal received",
            PROPOSAL_ACCEPTED => "Proposal accepted",
            PROPOSAL_REJECTED => "Proposal declined",
            PROPOSAL_REVISION_REQUESTED => "Proposal revision requested",
            PROJECT_STARTED => "Work has started",
            PROJECT_COMPLETED => "Project completed",
            MATERIALS_RETURNED => "Materials returned",
            other => other,
        };
        title.to_string()
    }

    /// One-line message body naming the project.
    pub fn message(&self) -> String {
        let name = &self.project_name;
        let base = match self.event_type.as_str() {
            PROJECT_SENT_TO_CONTRACTOR => format!("A client sent \"{name}\" for a quote."),
            PROJECT_REVIEW_STARTED => format!("\"{name}\" is being reviewed by your contractor."),
            PROPOSAL_SENT => format!("A proposal for \"{name}\" is ready for your review."),
            PROPOSAL_ACCEPTED => format!("Your proposal for \"{name}\" was accepted."),
            PROPOSAL_REJECTED => format!("Your proposal for \"{name}\" was declined."),
            PROPOSAL_REVISION_REQUESTED => {
                format!("A revised proposal for \"{name}\" was requested.")
            }
            PROJECT_STARTED => format!("Work on \"{name}\" has started."),
            PROJECT_COMPLETED => format!("\"{name}\" has been completed."),
            MATERIALS_RETURNED => format!("Materials for \"{name}\" were returned to stock."),
            other => format!("{other}: \"{name}\""),
        };
        match &self.detail {
            Some(detail) if !detail.trim().is_empty() => format!("{base} {}", detail.trim()),
            _ => base,
        }
    }

    /// Wrap the notice in a bus event.
    pub fn into_event(self) -> PlatformEvent {
        let event_type = self.event_type.clone();
        let project_id = self.project_id;
        let actor = self.from_user;
        let payload = serde_json::to_value(&self).unwrap_or_default();
        PlatformEvent::new(event_type)
            .with_entity("project", project_id)
            .with_actor(actor)
            .with_payload(payload)
    }

    /// Recover a notice from a bus event. Events that do not carry one
    /// yield `None`.
    pub fn from_event(event: &PlatformEvent) -> Option<Self> {
        if event.entity_type.as_deref() != Some("project") {
            return None;
        }
        serde_json::from_value(event.payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn notice(event_type: &str) -> ProjectNotice {
        ProjectNotice::new(event_type, 5, "Maple Ave re-roof", 1, 2)
    }

    #[test]
    fn only_rejection_and_completion_are_emailed() {
        assert!(notice(PROPOSAL_REJECTED).wants_email());
        assert!(notice(PROJECT_COMPLETED).wants_email());
        assert!(!notice(PROPOSAL_SENT).wants_email());
        assert!(!notice(PROJECT_SENT_TO_CONTRACTOR).wants_email());
    }

    #[test]
    fn event_wrapping_preserves_the_notice() {
        let original = notice(PROPOSAL_REJECTED)
            .with_email(Some("crew@roof.test".to_string()))
            .with_detail(Some("Too expensive".to_string()));

        let event = original.clone().into_event();
        assert_eq!(event.event_type, PROPOSAL_REJECTED);
        assert_eq!(event.entity_id, Some(5));
        assert_eq!(event.actor_user_id, Some(1));

        assert_matches!(ProjectNotice::from_event(&event), Some(n) if n == original);
    }

    #[test]
    fn unrelated_events_carry_no_notice() {
        let event = PlatformEvent::new("warehouse.updated").with_entity("warehouse", 3);
        assert!(ProjectNotice::from_event(&event).is_none());
    }

    #[test]
    fn message_appends_detail() {
        let n = notice(PROPOSAL_REJECTED).with_detail(Some("  Over budget ".to_string()));
        assert_eq!(
            n.message(),
            "Your proposal for \"Maple Ave re-roof\" was declined. Over budget"
        );
        assert_eq!(n.title(), "Proposal declined");
    }
}
