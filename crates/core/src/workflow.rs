//! Project lifecycle state machine.
//!
//! Every status change goes through [`validate_transition`], which looks the
//! `(from, to)` pair up in a static rule table, checks the caller's role and
//! preconditions, and returns the auxiliary field updates that must be
//! written together with the new status.
//!
//! ```text
//! DRAFT -> ACTIVE
//! DRAFT -> CLIENT_PENDING -> CONTRACTOR_REVIEWING -> PROPOSAL_SENT -> ACCEPTED | REJECTED
//! ACCEPTED -> IN_PROGRESS -> COMPLETED <-> ARCHIVED
//! REJECTED -> CONTRACTOR_REVIEWING | ARCHIVED
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Project status
// ---------------------------------------------------------------------------

/// Project lifecycle status. Stored as its SCREAMING_SNAKE_CASE name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Draft,
    Active,
    ClientPending,
    ContractorReviewing,
    ProposalSent,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 10] = [
        Self::Draft,
        Self::Active,
        Self::ClientPending,
        Self::ContractorReviewing,
        Self::ProposalSent,
        Self::Accepted,
        Self::Rejected,
        Self::InProgress,
        Self::Completed,
        Self::Archived,
    ];

    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid project status '{s}'")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::ClientPending => "CLIENT_PENDING",
            Self::ContractorReviewing => "CONTRACTOR_REVIEWING",
            Self::ProposalSent => "PROPOSAL_SENT",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Archived => "ARCHIVED",
        }
    }

    /// Project details (name, address, geometry) may only change before the
    /// project enters the quote flow.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Active)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses whose reserved ledger lines count against warehouse stock in
/// the low-stock scan.
pub const RESERVING_STATUSES: &[ProjectStatus] = &[
    ProjectStatus::ClientPending,
    ProjectStatus::InProgress,
    ProjectStatus::ContractorReviewing,
    ProjectStatus::ProposalSent,
    ProjectStatus::Accepted,
];

// ---------------------------------------------------------------------------
// Proposal sub-status
// ---------------------------------------------------------------------------

/// Proposal sub-status, independent of the main project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Sent,
    Accepted,
    Rejected,
    RevisionRequested,
}

impl ProposalStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SENT" => Ok(Self::Sent),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "REVISION_REQUESTED" => Ok(Self::RevisionRequested),
            _ => Err(CoreError::Validation(format!(
                "Invalid proposal status '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::RevisionRequested => "REVISION_REQUESTED",
        }
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// An assignment reference that must be set on the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Contractor,
    Client,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contractor => f.write_str("contractor"),
            Self::Client => f.write_str("client"),
        }
    }
}

/// Descriptor attached to one legal `(from, to)` pair.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub allowed_roles: &'static [Role],
    pub requires_proposal: bool,
    pub requires_assignment: Option<Assignment>,
    /// Proposal sub-status written together with the new project status.
    pub sets_proposal_status: Option<ProposalStatus>,
}

const CLIENT_SIDE: &[Role] = &[Role::Client, Role::Developer];
const CONTRACTOR_SIDE: &[Role] = &[Role::Admin, Role::Developer];
const EVERYONE: &[Role] = &[Role::Client, Role::Admin, Role::Developer];

const fn rule(allowed_roles: &'static [Role]) -> TransitionRule {
    TransitionRule {
        allowed_roles,
        requires_proposal: false,
        requires_assignment: None,
        sets_proposal_status: None,
    }
}

/// Every legal transition. Pairs absent from this list are illegal.
pub const TRANSITIONS: &[(ProjectStatus, ProjectStatus, TransitionRule)] = {
    use ProjectStatus::*;
    &[
        (Draft, Active, rule(EVERYONE)),
        (
            Draft,
            ClientPending,
            TransitionRule {
                requires_assignment: Some(Assignment::Contractor),
                ..rule(CLIENT_SIDE)
            },
        ),
        (
            ClientPending,
            ContractorReviewing,
            TransitionRule {
                requires_assignment: Some(Assignment::Contractor),
                sets_proposal_status: Some(ProposalStatus::Pending),
                ..rule(CONTRACTOR_SIDE)
            },
        ),
        (
            ContractorReviewing,
            ProposalSent,
            TransitionRule {
                requires_proposal: true,
                requires_assignment: Some(Assignment::Client),
                sets_proposal_status: Some(ProposalStatus::Sent),
                ..rule(CONTRACTOR_SIDE)
            },
        ),
        (
            ProposalSent,
            Accepted,
            TransitionRule {
                requires_proposal: true,
                requires_assignment: Some(Assignment::Contractor),
                sets_proposal_status: Some(ProposalStatus::Accepted),
                ..rule(CLIENT_SIDE)
            },
        ),
        (
            ProposalSent,
            Rejected,
            TransitionRule {
                requires_proposal: true,
                sets_proposal_status: Some(ProposalStatus::Rejected),
                ..rule(CLIENT_SIDE)
            },
        ),
        (
            Rejected,
            ContractorReviewing,
            TransitionRule {
                sets_proposal_status: Some(ProposalStatus::RevisionRequested),
                ..rule(EVERYONE)
            },
        ),
        (Rejected, Archived, rule(EVERYONE)),
        (
            Accepted,
            InProgress,
            TransitionRule {
                requires_assignment: Some(Assignment::Contractor),
                ..rule(CONTRACTOR_SIDE)
            },
        ),
        (InProgress, Completed, rule(CONTRACTOR_SIDE)),
        (Completed, Archived, rule(EVERYONE)),
        (Archived, Completed, rule(EVERYONE)),
    ]
};

static RULE_INDEX: LazyLock<HashMap<(ProjectStatus, ProjectStatus), TransitionRule>> =
    LazyLock::new(|| {
        TRANSITIONS
            .iter()
            .map(|(from, to, rule)| ((*from, *to), *rule))
            .collect()
    });

/// Look up the rule for a `(from, to)` pair.
pub fn find_rule(from: ProjectStatus, to: ProjectStatus) -> Option<&'static TransitionRule> {
    RULE_INDEX.get(&(from, to))
}

/// Statuses `role` may move a project to from `from`, ignoring preconditions.
pub fn allowed_targets(from: ProjectStatus, role: Role) -> Vec<ProjectStatus> {
    TRANSITIONS
        .iter()
        .filter(|(f, _, rule)| *f == from && rule.allowed_roles.contains(&role))
        .map(|(_, to, _)| *to)
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Failure modes of [`validate_transition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Cannot move project from {from} to {to}")]
    InvalidTransition {
        from: ProjectStatus,
        to: ProjectStatus,
    },

    #[error("Role {role} may not move a project from {from} to {to}")]
    RoleNotPermitted {
        role: Role,
        from: ProjectStatus,
        to: ProjectStatus,
    },

    #[error("Moving a project from {from} to {to} requires a proposal")]
    ProposalRequired {
        from: ProjectStatus,
        to: ProjectStatus,
    },

    #[error("Moving a project from {from} to {to} requires an assigned {assignment}")]
    MissingAssignment {
        assignment: Assignment,
        from: ProjectStatus,
        to: ProjectStatus,
    },
}

/// Assignment fields of a project, read from storage before the transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectSnapshot {
    pub contractor_id: Option<DbId>,
    pub client_id: Option<DbId>,
}

impl ProjectSnapshot {
    fn has(&self, assignment: Assignment) -> bool {
        match assignment {
            Assignment::Contractor => self.contractor_id.is_some(),
            Assignment::Client => self.client_id.is_some(),
        }
    }
}

/// Field updates to apply atomically with the status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TransitionEffects {
    pub proposal_status: Option<ProposalStatus>,
}

/// Validate a status change.
///
/// Checks run in order: rule lookup, role, proposal presence, assignment.
/// A rule that requires an assignment fails when `snapshot` is `None`.
pub fn validate_transition(
    from: ProjectStatus,
    to: ProjectStatus,
    role: Role,
    has_proposal: bool,
    snapshot: Option<&ProjectSnapshot>,
) -> Result<TransitionEffects, WorkflowError> {
    let rule = find_rule(from, to).ok_or(WorkflowError::InvalidTransition { from, to })?;

    if !rule.allowed_roles.contains(&role) {
        return Err(WorkflowError::RoleNotPermitted { role, from, to });
    }

    if rule.requires_proposal && !has_proposal {
        return Err(WorkflowError::ProposalRequired { from, to });
    }

    if let Some(assignment) = rule.requires_assignment {
        if !snapshot.is_some_and(|s| s.has(assignment)) {
            return Err(WorkflowError::MissingAssignment {
                assignment,
                from,
                to,
            });
        }
    }

    Ok(TransitionEffects {
        proposal_status: rule.sets_proposal_status,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use ProjectStatus::*;

    const ROLES: [Role; 3] = [Role::Client, Role::Admin, Role::Developer];

    fn assigned() -> ProjectSnapshot {
        ProjectSnapshot {
            contractor_id: Some(10),
            client_id: Some(20),
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::from_str_db(status.as_str()).unwrap(), status);
        }
        assert!(ProjectStatus::from_str_db("draft").is_err());
    }

    #[test]
    fn proposal_status_strings_round_trip() {
        for s in ["PENDING", "SENT", "ACCEPTED", "REJECTED", "REVISION_REQUESTED"] {
            assert_eq!(ProposalStatus::from_str_db(s).unwrap().as_str(), s);
        }
        assert!(ProposalStatus::from_str_db("DRAFT").is_err());
    }

    #[test]
    fn table_has_no_duplicate_pairs() {
        assert_eq!(RULE_INDEX.len(), TRANSITIONS.len());
    }

    #[test]
    fn pairs_outside_table_are_invalid_for_every_role() {
        for from in ProjectStatus::ALL {
            for to in ProjectStatus::ALL {
                if find_rule(from, to).is_some() {
                    continue;
                }
                for role in ROLES {
                    let result = validate_transition(from, to, role, true, Some(&assigned()));
                    assert_eq!(
                        result,
                        Err(WorkflowError::InvalidTransition { from, to }),
                        "{from} -> {to} as {role}"
                    );
                }
            }
        }
    }

    #[test]
    fn roles_outside_rule_are_not_permitted() {
        for (from, to, rule) in TRANSITIONS {
            for role in ROLES.iter().filter(|r| !rule.allowed_roles.contains(*r)) {
                let result = validate_transition(*from, *to, *role, true, Some(&assigned()));
                assert_matches!(result, Err(WorkflowError::RoleNotPermitted { .. }));
            }
        }
    }

    #[test]
    fn developer_may_perform_every_transition() {
        for (from, to, _) in TRANSITIONS {
            assert!(
                validate_transition(*from, *to, Role::Developer, true, Some(&assigned())).is_ok(),
                "{from} -> {to}"
            );
        }
    }

    #[test]
    fn accept_requires_contractor() {
        let no_contractor = ProjectSnapshot {
            contractor_id: None,
            client_id: Some(20),
        };
        let result = validate_transition(
            ProposalSent,
            Accepted,
            Role::Client,
            true,
            Some(&no_contractor),
        );
        assert_matches!(
            result,
            Err(WorkflowError::MissingAssignment {
                assignment: Assignment::Contractor,
                ..
            })
        );

        let effects =
            validate_transition(ProposalSent, Accepted, Role::Client, true, Some(&assigned()))
                .unwrap();
        assert_eq!(effects.proposal_status, Some(ProposalStatus::Accepted));
    }

    #[test]
    fn sending_proposal_requires_client() {
        let no_client = ProjectSnapshot {
            contractor_id: Some(10),
            client_id: None,
        };
        let result = validate_transition(
            ContractorReviewing,
            ProposalSent,
            Role::Admin,
            true,
            Some(&no_client),
        );
        assert_matches!(
            result,
            Err(WorkflowError::MissingAssignment {
                assignment: Assignment::Client,
                ..
            })
        );
    }

    #[test]
    fn missing_snapshot_fails_assignment_rules() {
        let result = validate_transition(ProposalSent, Accepted, Role::Client, true, None);
        assert_matches!(result, Err(WorkflowError::MissingAssignment { .. }));
    }

    #[test]
    fn proposal_required_checked_before_assignment() {
        let result = validate_transition(ProposalSent, Rejected, Role::Client, false, None);
        assert_eq!(
            result,
            Err(WorkflowError::ProposalRequired {
                from: ProposalSent,
                to: Rejected
            })
        );
    }

    #[test]
    fn role_checked_before_proposal() {
        let result = validate_transition(ProposalSent, Accepted, Role::Admin, false, None);
        assert_matches!(result, Err(WorkflowError::RoleNotPermitted { .. }));
    }

    #[test]
    fn draft_and_active_have_no_predecessor() {
        for (_, to, _) in TRANSITIONS {
            assert_ne!(*to, Draft);
            assert_ne!(*to, Active);
        }
    }

    #[test]
    fn full_quote_lifecycle_is_walkable() {
        let steps = [
            (Draft, ClientPending, Role::Client, None),
            (ClientPending, ContractorReviewing, Role::Admin, Some(ProposalStatus::Pending)),
            (ContractorReviewing, ProposalSent, Role::Admin, Some(ProposalStatus::Sent)),
            (ProposalSent, Accepted, Role::Client, Some(ProposalStatus::Accepted)),
            (Accepted, InProgress, Role::Admin, None),
            (InProgress, Completed, Role::Admin, None),
            (Completed, Archived, Role::Client, None),
            (Archived, Completed, Role::Client, None),
        ];
        for (from, to, role, expected) in steps {
            let effects = validate_transition(from, to, role, true, Some(&assigned()))
                .unwrap_or_else(|e| panic!("{from} -> {to}: {e}"));
            assert_eq!(effects.proposal_status, expected);
        }
    }

    #[test]
    fn rejected_proposal_can_be_revised_or_archived() {
        let effects =
            validate_transition(Rejected, ContractorReviewing, Role::Client, false, None).unwrap();
        assert_eq!(
            effects.proposal_status,
            Some(ProposalStatus::RevisionRequested)
        );
        assert!(validate_transition(Rejected, Archived, Role::Admin, false, None).is_ok());
    }

    #[test]
    fn allowed_targets_respects_role() {
        assert_eq!(
            allowed_targets(ProposalSent, Role::Client),
            vec![Accepted, Rejected]
        );
        assert!(allowed_targets(ProposalSent, Role::Admin).is_empty());
        assert_eq!(allowed_targets(Draft, Role::Admin), vec![Active]);
    }

    #[test]
    fn editable_only_before_quote_flow() {
        assert!(Draft.is_editable());
        assert!(Active.is_editable());
        assert!(!ClientPending.is_editable());
        assert!(!Completed.is_editable());
    }
}
