// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use std::fmt;

use crate::ticket::TicketStatus;

/// Why the capability table refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
	/// The role never holds this capability.
	RoleNotPermitted,
	/// The actor has no organization to act within.
	NoOrganization,
	/// The target belongs to another organization.
	OutsideOrganization,
	/// The actor did not raise the ticket.
	NotRequester,
	/// The actor is not the contractor assigned to the ticket.
	NotAssignedContractor,
	/// The transition is only reachable through contractor assignment.
	RequiresAssignment,
	/// Org admins cannot grant the super admin role.
	CannotGrantSuperAdmin,
	/// The action needs a target that was not supplied.
	MissingTarget,
}

impl DenyReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			DenyReason::RoleNotPermitted => "role_not_permitted",
			DenyReason::NoOrganization => "no_organization",
			DenyReason::OutsideOrganization => "outside_organization",
			DenyReason::NotRequester => "not_requester",
			DenyReason::NotAssignedContractor => "not_assigned_contractor",
			DenyReason::RequiresAssignment => "requires_assignment",
			DenyReason::CannotGrantSuperAdmin => "cannot_grant_super_admin",
			DenyReason::MissingTarget => "missing_target",
		}
	}
}

impl fmt::Display for DenyReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Outcome of every rejected policy decision.
///
/// Each variant is terminal for the current invocation; none of them reflect a
/// transient fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
	#[error("access denied: {0}")]
	Denied(DenyReason),

	#[error("invalid transition from {from} to {to}")]
	InvalidTransition { from: TicketStatus, to: TicketStatus },

	#[error("candidate is not a contractor")]
	NotAContractor,

	#[error("contractor belongs to a different organization")]
	CrossOrgAssignmentDenied,

	#[error("ticket in status {0} cannot be assigned")]
	TicketNotAssignable(TicketStatus),

	#[error("ticket in status {0} has no assignment to remove")]
	NotAssigned(TicketStatus),

	#[error("validation failed: {0}")]
	Validation(String),
}

impl PolicyError {
	pub fn validation(message: impl Into<String>) -> Self {
		PolicyError::Validation(message.into())
	}

	/// Stable machine-readable code for API responses and audit records.
	pub fn code(&self) -> &'static str {
		match self {
			PolicyError::Denied(_) => "forbidden",
			PolicyError::InvalidTransition { .. } => "invalid_transition",
			PolicyError::NotAContractor => "not_a_contractor",
			PolicyError::CrossOrgAssignmentDenied => "cross_org_assignment_denied",
			PolicyError::TicketNotAssignable(_) => "ticket_not_assignable",
			PolicyError::NotAssigned(_) => "not_assigned",
			PolicyError::Validation(_) => "validation_error",
		}
	}
}

pub type Result<T> = std::result::Result<T, PolicyError>;

/// Failure to parse a string label into one of the closed enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseError {
	pub kind: &'static str,
	pub value: String,
}

impl ParseError {
	pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
		Self {
			kind,
			value: value.to_string(),
		}
	}
}
