// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assigning contractors to tickets and removing them again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::actor::{Actor, Profile};
use crate::capability::{self, Action, Target};
use crate::error::{PolicyError, Result};
use crate::ticket::{NotificationIntent, Ticket, TicketStatus, TicketUpdate, UpdateType};
use crate::transition::StatusOutcome;
use crate::types::Role;

/// Scheduling details supplied with an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
	/// Minutes. Must be positive when present.
	#[serde(default)]
	pub estimated_duration: Option<u32>,
	#[serde(default)]
	pub scheduled_arrival: Option<DateTime<Utc>>,
}

/// A successful assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
	pub ticket: Ticket,
	pub update: TicketUpdate,
	/// Always addressed to the newly assigned contractor.
	pub notification: NotificationIntent,
}

/// Assigns `candidate` to the ticket.
///
/// Checks run in order and the first failure wins:
///
/// 1. `assign_contractor` capability on the ticket
/// 2. the candidate holds the contractor role
/// 3. for org admins, the candidate belongs to the ticket's organization
/// 4. the ticket is `open`, `assigned` or `accepted`
///
/// Reassigning an `accepted` ticket puts it back to `assigned`.
#[instrument(
	skip(actor, ticket, candidate, request, now),
	fields(actor_id = %actor.id, ticket_id = %ticket.id, contractor_id = %candidate.id)
)]
pub fn assign(
	actor: &Actor,
	ticket: &Ticket,
	candidate: &Profile,
	request: &AssignRequest,
	now: DateTime<Utc>,
) -> Result<Assignment> {
	capability::check(actor, Action::AssignContractor, Target::Ticket(ticket))?;

	if candidate.role != Role::Contractor {
		return Err(PolicyError::NotAContractor);
	}

	if actor.role == Role::OrgAdmin && candidate.organization_id != Some(ticket.organization_id) {
		return Err(PolicyError::CrossOrgAssignmentDenied);
	}

	if !matches!(
		ticket.status,
		TicketStatus::Open | TicketStatus::Assigned | TicketStatus::Accepted
	) {
		return Err(PolicyError::TicketNotAssignable(ticket.status));
	}

	if request.estimated_duration == Some(0) {
		return Err(PolicyError::validation(
			"estimated_duration must be a positive number of minutes",
		));
	}

	let mut updated = ticket.clone();
	updated.contractor_id = Some(candidate.id);
	updated.contractor_name = Some(candidate.full_name.clone());
	updated.admin_id = Some(actor.id);
	updated.status = TicketStatus::Assigned;
	updated.estimated_duration = request.estimated_duration;
	updated.scheduled_arrival = request.scheduled_arrival;
	updated.updated_at = now;

	let update = TicketUpdate::record(ticket.id, UpdateType::Assigned, actor.id, now)
		.with_statuses(Some(ticket.status), TicketStatus::Assigned)
		.with_note(Some(format!("Assigned to {}", candidate.full_name)));

	let notification = NotificationIntent::email(
		candidate.id,
		ticket,
		format!("You have been assigned to ticket \"{}\"", ticket.title),
	);

	info!(
		previous = ?ticket.contractor_id,
		cross_org = candidate.organization_id != Some(ticket.organization_id),
		"contractor assigned"
	);

	Ok(Assignment {
		ticket: updated,
		update,
		notification,
	})
}

/// Removes the contractor from an `assigned` or `accepted` ticket and
/// reopens it.
///
/// The returned notification, if any, tells the removed contractor.
#[instrument(skip(actor, ticket, now), fields(actor_id = %actor.id, ticket_id = %ticket.id))]
pub fn unassign(actor: &Actor, ticket: &Ticket, now: DateTime<Utc>) -> Result<StatusOutcome> {
	capability::check(actor, Action::UnassignContractor, Target::Ticket(ticket))?;

	if !matches!(ticket.status, TicketStatus::Assigned | TicketStatus::Accepted) {
		return Err(PolicyError::NotAssigned(ticket.status));
	}

	let mut updated = ticket.clone();
	updated.contractor_id = None;
	updated.contractor_name = None;
	updated.admin_id = None;
	updated.estimated_duration = None;
	updated.scheduled_arrival = None;
	updated.status = TicketStatus::Open;
	updated.updated_at = now;

	let update = TicketUpdate::record(ticket.id, UpdateType::Unassigned, actor.id, now)
		.with_statuses(Some(ticket.status), TicketStatus::Open);

	let notification = ticket.contractor_id.map(|contractor| {
		NotificationIntent::email(
			contractor,
			ticket,
			format!("You have been removed from ticket \"{}\"", ticket.title),
		)
	});

	info!(previous = ?ticket.contractor_id, "contractor unassigned");

	Ok(StatusOutcome {
		ticket: updated,
		update,
		notification,
	})
}
