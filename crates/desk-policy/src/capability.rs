// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role capability table.
//!
//! Every entry point asks [`evaluate`] (or one of its wrappers) whether an
//! actor may perform an [`Action`] against a [`Target`]. There is exactly one
//! copy of these rules; handlers never re-derive permissions.
//!
//! Super admins take their own branch in every rule and are never compared
//! against an organization, since they belong to none.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

use crate::actor::Actor;
use crate::error::{DenyReason, PolicyError, Result};
use crate::ticket::{Ticket, TicketStatus};
use crate::types::{OrgId, Role, UserId};

/// Operations gated by the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	CreateTicket,
	ViewTicket,
	UpdateStatus,
	AssignContractor,
	UnassignContractor,
	PostComment,
	ManageUsers,
	ManageOrganizations,
	/// Explicit emergency access. Always audited.
	BreakGlass,
}

impl Action {
	pub fn all() -> &'static [Action] {
		&[
			Action::CreateTicket,
			Action::ViewTicket,
			Action::UpdateStatus,
			Action::AssignContractor,
			Action::UnassignContractor,
			Action::PostComment,
			Action::ManageUsers,
			Action::ManageOrganizations,
			Action::BreakGlass,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Action::CreateTicket => "create_ticket",
			Action::ViewTicket => "view_ticket",
			Action::UpdateStatus => "update_status",
			Action::AssignContractor => "assign_contractor",
			Action::UnassignContractor => "unassign_contractor",
			Action::PostComment => "post_comment",
			Action::ManageUsers => "manage_users",
			Action::ManageOrganizations => "manage_organizations",
			Action::BreakGlass => "break_glass",
		}
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What an action is aimed at.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
	/// No specific resource (ticket creation, organization management).
	None,
	Ticket(&'a Ticket),
	/// A profile being created or changed.
	Member {
		organization_id: Option<OrgId>,
		role: Role,
	},
	/// The membership of an organization, e.g. for listing profiles.
	Organization(Option<OrgId>),
}

/// Result of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	Allow,
	Deny(DenyReason),
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow)
	}

	pub fn into_result(self) -> Result<()> {
		match self {
			Decision::Allow => Ok(()),
			Decision::Deny(reason) => Err(PolicyError::Denied(reason)),
		}
	}
}

/// Evaluates the capability table for one `(actor, action, target)` triple.
#[instrument(
	level = "debug",
	skip(actor, target),
	fields(actor_id = %actor.id, role = %actor.role, action = %action)
)]
pub fn evaluate(actor: &Actor, action: Action, target: Target<'_>) -> Decision {
	let decision = match action {
		Action::CreateTicket => create_ticket(actor),
		Action::ViewTicket | Action::PostComment => match target {
			Target::Ticket(ticket) => view_ticket(actor, ticket),
			_ => Decision::Deny(DenyReason::MissingTarget),
		},
		Action::UpdateStatus => match target {
			Target::Ticket(ticket) => update_status(actor, ticket),
			_ => Decision::Deny(DenyReason::MissingTarget),
		},
		Action::AssignContractor | Action::UnassignContractor => match target {
			Target::Ticket(ticket) => administer_ticket(actor, ticket),
			_ => Decision::Deny(DenyReason::MissingTarget),
		},
		Action::ManageUsers => manage_users(actor, target),
		Action::ManageOrganizations | Action::BreakGlass => super_admin_only(actor),
	};

	tracing::debug!(allowed = decision.is_allowed(), "capability evaluated");
	decision
}

/// Like [`evaluate`], but as a `Result` so callers can use `?`.
pub fn check(actor: &Actor, action: Action, target: Target<'_>) -> Result<()> {
	evaluate(actor, action, target).into_result()
}

pub fn is_allowed(actor: &Actor, action: Action, target: Target<'_>) -> bool {
	evaluate(actor, action, target).is_allowed()
}

/// Returns true if the actor administers the ticket: a super admin, or an
/// org admin of the ticket's organization.
pub fn is_ticket_admin(actor: &Actor, ticket: &Ticket) -> bool {
	match actor.role {
		Role::SuperAdmin => true,
		Role::OrgAdmin => actor.in_org(ticket.organization_id),
		Role::Contractor | Role::User => false,
	}
}

fn create_ticket(actor: &Actor) -> Decision {
	match actor.role {
		Role::SuperAdmin => Decision::Deny(DenyReason::NoOrganization),
		Role::OrgAdmin | Role::Contractor | Role::User => {
			if actor.organization_id.is_some() {
				Decision::Allow
			} else {
				Decision::Deny(DenyReason::NoOrganization)
			}
		}
	}
}

fn view_ticket(actor: &Actor, ticket: &Ticket) -> Decision {
	match actor.role {
		Role::SuperAdmin => Decision::Allow,
		Role::OrgAdmin => same_org(actor, ticket),
		Role::Contractor => {
			let claimable =
				ticket.status == TicketStatus::Open && actor.in_org(ticket.organization_id);
			if ticket.is_requester(actor.id) || ticket.is_assigned_to(actor.id) || claimable {
				Decision::Allow
			} else {
				Decision::Deny(DenyReason::NotAssignedContractor)
			}
		}
		Role::User => {
			if ticket.is_requester(actor.id) {
				Decision::Allow
			} else {
				Decision::Deny(DenyReason::NotRequester)
			}
		}
	}
}

fn update_status(actor: &Actor, ticket: &Ticket) -> Decision {
	match actor.role {
		Role::SuperAdmin => Decision::Allow,
		Role::OrgAdmin => same_org(actor, ticket),
		Role::Contractor => {
			if ticket.is_assigned_to(actor.id) {
				Decision::Allow
			} else {
				Decision::Deny(DenyReason::NotAssignedContractor)
			}
		}
		Role::User => Decision::Deny(DenyReason::RoleNotPermitted),
	}
}

fn administer_ticket(actor: &Actor, ticket: &Ticket) -> Decision {
	match actor.role {
		Role::SuperAdmin => Decision::Allow,
		Role::OrgAdmin => same_org(actor, ticket),
		Role::Contractor | Role::User => Decision::Deny(DenyReason::RoleNotPermitted),
	}
}

fn manage_users(actor: &Actor, target: Target<'_>) -> Decision {
	match actor.role {
		Role::SuperAdmin => Decision::Allow,
		Role::OrgAdmin => match target {
			Target::Member { role: Role::SuperAdmin, .. } => {
				Decision::Deny(DenyReason::CannotGrantSuperAdmin)
			}
			Target::Member {
				organization_id, ..
			}
			| Target::Organization(organization_id) => match organization_id {
				Some(org) if actor.in_org(org) => Decision::Allow,
				_ => Decision::Deny(DenyReason::OutsideOrganization),
			},
			Target::None | Target::Ticket(_) => Decision::Deny(DenyReason::MissingTarget),
		},
		Role::Contractor | Role::User => Decision::Deny(DenyReason::RoleNotPermitted),
	}
}

fn super_admin_only(actor: &Actor) -> Decision {
	if actor.is_super_admin() {
		Decision::Allow
	} else {
		Decision::Deny(DenyReason::RoleNotPermitted)
	}
}

fn same_org(actor: &Actor, ticket: &Ticket) -> Decision {
	if actor.in_org(ticket.organization_id) {
		Decision::Allow
	} else {
		Decision::Deny(DenyReason::OutsideOrganization)
	}
}

/// The `view_ticket` rule expressed as a listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
	/// Every ticket on the platform.
	All,
	/// Every ticket in one organization.
	Organization(OrgId),
	/// Tickets the contractor raised or is assigned to, plus open tickets of
	/// their organization.
	Contractor {
		organization_id: Option<OrgId>,
		contractor_id: UserId,
	},
	/// Tickets the user raised.
	Requester(UserId),
	/// Nothing is visible.
	Nothing,
}

impl TicketScope {
	/// Returns true if the ticket falls inside this scope.
	pub fn includes(&self, ticket: &Ticket) -> bool {
		match *self {
			TicketScope::All => true,
			TicketScope::Organization(org) => ticket.organization_id == org,
			TicketScope::Contractor {
				organization_id,
				contractor_id,
			} => {
				ticket.is_requester(contractor_id)
					|| ticket.is_assigned_to(contractor_id)
					|| (ticket.status == TicketStatus::Open
						&& Some(ticket.organization_id) == organization_id)
			}
			TicketScope::Requester(user) => ticket.is_requester(user),
			TicketScope::Nothing => false,
		}
	}
}

/// Returns the listing filter equivalent to `view_ticket` for this actor.
pub fn visibility_scope(actor: &Actor) -> TicketScope {
	match actor.role {
		Role::SuperAdmin => TicketScope::All,
		Role::OrgAdmin => match actor.organization_id {
			Some(org) => TicketScope::Organization(org),
			None => TicketScope::Nothing,
		},
		Role::Contractor => TicketScope::Contractor {
			organization_id: actor.organization_id,
			contractor_id: actor.id,
		},
		Role::User => TicketScope::Requester(actor.id),
	}
}
