// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ticket status transition graph.
//!
//! ```text
//! open -> assigned -> accepted -> in_progress -> completed -> closed
//!   \         \           \
//!    `---------`-----------`--> cancelled
//! ```
//!
//! The edge table is consulted before the actor, so a pair with no edge is
//! always [`PolicyError::InvalidTransition`] and a real edge the actor may not
//! take is always [`PolicyError::Denied`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::actor::Actor;
use crate::capability::{self, is_ticket_admin, Action, Target};
use crate::error::{DenyReason, PolicyError, Result};
use crate::ticket::{NotificationIntent, Ticket, TicketStatus, TicketUpdate, UpdateType};

/// Who may take an edge of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
	/// Reached only through contractor assignment, never by a status request.
	Assignment,
	AssignedContractor,
	AssignedContractorOrAdmin,
	Admin,
	AdminOrRequester,
}

/// Returns who may move a ticket from `from` to `to`, or `None` if the graph
/// has no such edge.
pub fn edge(from: TicketStatus, to: TicketStatus) -> Option<Mover> {
	use TicketStatus::*;

	match (from, to) {
		(Open, Assigned) => Some(Mover::Assignment),
		(Open, Cancelled) => Some(Mover::AdminOrRequester),
		(Assigned, Accepted) => Some(Mover::AssignedContractor),
		(Assigned, Cancelled) => Some(Mover::AssignedContractorOrAdmin),
		(Accepted, InProgress) => Some(Mover::AssignedContractor),
		(Accepted, Cancelled) => Some(Mover::AssignedContractorOrAdmin),
		(InProgress, Completed) => Some(Mover::AssignedContractor),
		(Completed, Closed) => Some(Mover::Admin),
		_ => None,
	}
}

pub fn is_valid_transition(from: TicketStatus, to: TicketStatus) -> bool {
	edge(from, to).is_some()
}

/// Statuses reachable from `from` in one step.
pub fn next_statuses(from: TicketStatus) -> Vec<TicketStatus> {
	TicketStatus::all()
		.iter()
		.copied()
		.filter(|to| is_valid_transition(from, *to))
		.collect()
}

/// A request to move a ticket to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
	pub status: TicketStatus,
	#[serde(default)]
	pub note: Option<String>,
}

impl StatusRequest {
	pub fn to(status: TicketStatus) -> Self {
		Self { status, note: None }
	}

	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());
		self
	}
}

/// The mutated ticket plus the records to persist alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
	pub ticket: Ticket,
	pub update: TicketUpdate,
	pub notification: Option<NotificationIntent>,
}

/// Applies a status request to a ticket.
///
/// The input ticket is never modified; on success the returned outcome holds
/// the new ticket and exactly one [`TicketUpdate`].
///
/// # Errors
///
/// - [`PolicyError::InvalidTransition`] if the graph has no such edge, or
///   `to == from` without a note
/// - [`PolicyError::Denied`] if the actor lacks `update_status` on the ticket
///   or may not take this particular edge
#[instrument(
	skip(actor, ticket, request, now),
	fields(actor_id = %actor.id, ticket_id = %ticket.id, from = %ticket.status, to = %request.status)
)]
pub fn update_status(
	actor: &Actor,
	ticket: &Ticket,
	request: &StatusRequest,
	now: DateTime<Utc>,
) -> Result<StatusOutcome> {
	let from = ticket.status;
	let to = request.status;
	let note = request
		.note
		.as_deref()
		.map(str::trim)
		.filter(|n| !n.is_empty())
		.map(str::to_string);

	if from == to {
		let Some(note) = note else {
			return Err(PolicyError::InvalidTransition { from, to });
		};
		capability::check(actor, Action::UpdateStatus, Target::Ticket(ticket))?;

		let mut updated = ticket.clone();
		updated.updated_at = now;
		let update =
			TicketUpdate::record(ticket.id, UpdateType::Comment, actor.id, now).with_note(Some(note));
		return Ok(StatusOutcome {
			ticket: updated,
			update,
			notification: None,
		});
	}

	let mover = edge(from, to).ok_or(PolicyError::InvalidTransition { from, to })?;
	capability::check(actor, Action::UpdateStatus, Target::Ticket(ticket))?;

	let assigned = ticket.is_assigned_to(actor.id);
	let admin = is_ticket_admin(actor, ticket);
	match mover {
		Mover::Assignment => return Err(PolicyError::Denied(DenyReason::RequiresAssignment)),
		Mover::AssignedContractor if !assigned => {
			return Err(PolicyError::Denied(DenyReason::NotAssignedContractor))
		}
		Mover::AssignedContractorOrAdmin if !(assigned || admin) => {
			return Err(PolicyError::Denied(DenyReason::NotAssignedContractor))
		}
		Mover::Admin if !admin => return Err(PolicyError::Denied(DenyReason::RoleNotPermitted)),
		Mover::AdminOrRequester if !(admin || ticket.is_requester(actor.id)) => {
			return Err(PolicyError::Denied(DenyReason::NotRequester))
		}
		_ => {}
	}

	let update_type = if to == TicketStatus::Cancelled && from == TicketStatus::Assigned && assigned
	{
		UpdateType::Rejected
	} else {
		update_type_for(to)
	};

	let mut updated = ticket.clone();
	updated.status = to;
	updated.updated_at = now;

	let update = TicketUpdate::record(ticket.id, update_type, actor.id, now)
		.with_statuses(Some(from), to)
		.with_note(note);

	let notification = (!ticket.is_requester(actor.id)).then(|| {
		NotificationIntent::email(
			ticket.requester_id,
			ticket,
			format!("Your ticket \"{}\" is now {}", ticket.title, to),
		)
	});

	info!(from = %from, to = %to, update_type = %update_type, "ticket status transition");

	Ok(StatusOutcome {
		ticket: updated,
		update,
		notification,
	})
}

fn update_type_for(to: TicketStatus) -> UpdateType {
	match to {
		TicketStatus::Assigned => UpdateType::Assigned,
		TicketStatus::Accepted => UpdateType::Accepted,
		TicketStatus::InProgress => UpdateType::InProgress,
		TicketStatus::Completed => UpdateType::Completed,
		TicketStatus::Closed => UpdateType::Closed,
		TicketStatus::Cancelled => UpdateType::Cancelled,
		TicketStatus::Open => UpdateType::Unassigned,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{arb_actor, arb_edge, arb_status, arb_ticket, contractor, org_admin, sample_ticket, user};
	use crate::types::{OrgId, Role, UserId};
	use proptest::prelude::*;

	fn now() -> DateTime<Utc> {
		Utc::now()
	}

	fn assigned_ticket(org: OrgId, worker: &Actor, status: TicketStatus) -> Ticket {
		let mut ticket = sample_ticket(org, UserId::generate());
		ticket.status = status;
		ticket.contractor_id = Some(worker.id);
		ticket.contractor_name = Some("Casey".to_string());
		ticket
	}

	#[test]
	fn graph_has_exactly_eight_edges() {
		let count = TicketStatus::all()
			.iter()
			.map(|from| next_statuses(*from).len())
			.sum::<usize>();
		assert_eq!(count, 8);
	}

	#[test]
	fn terminal_statuses_have_no_edges() {
		assert!(next_statuses(TicketStatus::Closed).is_empty());
		assert!(next_statuses(TicketStatus::Cancelled).is_empty());
	}

	#[test]
	fn contractor_walks_the_happy_path() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let mut ticket = assigned_ticket(org, &worker, TicketStatus::Assigned);

		for (to, kind) in [
			(TicketStatus::Accepted, UpdateType::Accepted),
			(TicketStatus::InProgress, UpdateType::InProgress),
			(TicketStatus::Completed, UpdateType::Completed),
		] {
			let outcome = update_status(&worker, &ticket, &StatusRequest::to(to), now()).unwrap();
			assert_eq!(outcome.ticket.status, to);
			assert_eq!(outcome.update.update_type, kind);
			assert_eq!(outcome.update.old_status, Some(ticket.status));
			assert_eq!(outcome.update.new_status, Some(to));
			assert!(outcome.notification.is_some());
			ticket = outcome.ticket;
		}
	}

	#[test]
	fn contractor_cannot_close_own_work() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let ticket = assigned_ticket(org, &worker, TicketStatus::Completed);

		let err = update_status(&worker, &ticket, &StatusRequest::to(TicketStatus::Closed), now())
			.unwrap_err();
		assert_eq!(err, PolicyError::Denied(DenyReason::RoleNotPermitted));

		let admin = org_admin(org);
		let outcome =
			update_status(&admin, &ticket, &StatusRequest::to(TicketStatus::Closed), now()).unwrap();
		assert_eq!(outcome.ticket.status, TicketStatus::Closed);
	}

	#[test]
	fn decline_by_assigned_contractor_is_recorded_as_rejected() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let ticket = assigned_ticket(org, &worker, TicketStatus::Assigned);

		let request = StatusRequest::to(TicketStatus::Cancelled).with_note("not my trade");
		let outcome = update_status(&worker, &ticket, &request, now()).unwrap();
		assert_eq!(outcome.ticket.status, TicketStatus::Cancelled);
		assert_eq!(outcome.update.update_type, UpdateType::Rejected);
		assert_eq!(outcome.update.note.as_deref(), Some("not my trade"));
	}

	#[test]
	fn admin_cancel_is_recorded_as_cancelled() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let ticket = assigned_ticket(org, &worker, TicketStatus::Assigned);

		let outcome = update_status(
			&org_admin(org),
			&ticket,
			&StatusRequest::to(TicketStatus::Cancelled),
			now(),
		)
		.unwrap();
		assert_eq!(outcome.update.update_type, UpdateType::Cancelled);
	}

	#[test]
	fn open_to_assigned_requires_the_assignment_path() {
		let org = OrgId::generate();
		let ticket = sample_ticket(org, UserId::generate());
		let err = update_status(
			&org_admin(org),
			&ticket,
			&StatusRequest::to(TicketStatus::Assigned),
			now(),
		)
		.unwrap_err();
		assert_eq!(err, PolicyError::Denied(DenyReason::RequiresAssignment));
	}

	#[test]
	fn accepted_to_completed_is_not_an_edge() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let ticket = assigned_ticket(org, &worker, TicketStatus::Accepted);

		let err = update_status(&worker, &ticket, &StatusRequest::to(TicketStatus::Completed), now())
			.unwrap_err();
		assert_eq!(
			err,
			PolicyError::InvalidTransition {
				from: TicketStatus::Accepted,
				to: TicketStatus::Completed
			}
		);
	}

	#[test]
	fn same_status_with_note_is_comment_only() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let ticket = assigned_ticket(org, &worker, TicketStatus::InProgress);
		let at = now();

		let request = StatusRequest::to(TicketStatus::InProgress).with_note("parts on order");
		let outcome = update_status(&worker, &ticket, &request, at).unwrap();
		assert_eq!(outcome.ticket.status, TicketStatus::InProgress);
		assert_eq!(outcome.ticket.updated_at, at);
		assert_eq!(outcome.update.update_type, UpdateType::Comment);
		assert_eq!(outcome.update.old_status, None);
		assert_eq!(outcome.update.new_status, None);
		assert_eq!(outcome.update.note.as_deref(), Some("parts on order"));
	}

	#[test]
	fn same_status_without_note_is_invalid() {
		let org = OrgId::generate();
		let worker = contractor(org);
		let ticket = assigned_ticket(org, &worker, TicketStatus::InProgress);

		let request = StatusRequest::to(TicketStatus::InProgress).with_note("   ");
		let err = update_status(&worker, &ticket, &request, now()).unwrap_err();
		assert!(matches!(err, PolicyError::InvalidTransition { .. }));
	}

	#[test]
	fn requester_cancel_needs_update_status() {
		let org = OrgId::generate();
		let requester = user(org);
		let ticket = sample_ticket(org, requester.id);
		let err = update_status(
			&requester,
			&ticket,
			&StatusRequest::to(TicketStatus::Cancelled),
			now(),
		)
		.unwrap_err();
		assert_eq!(err, PolicyError::Denied(DenyReason::RoleNotPermitted));

		let admin_requester = org_admin(org);
		let own = sample_ticket(org, admin_requester.id);
		let outcome = update_status(
			&admin_requester,
			&own,
			&StatusRequest::to(TicketStatus::Cancelled),
			now(),
		)
		.unwrap();
		assert!(outcome.notification.is_none());
	}

	#[test]
	fn foreign_org_admin_is_denied() {
		let worker = contractor(OrgId::generate());
		let ticket = assigned_ticket(OrgId::generate(), &worker, TicketStatus::Completed);
		let err = update_status(
			&org_admin(OrgId::generate()),
			&ticket,
			&StatusRequest::to(TicketStatus::Closed),
			now(),
		)
		.unwrap_err();
		assert_eq!(err, PolicyError::Denied(DenyReason::OutsideOrganization));
	}

	proptest! {
		#[test]
		fn absent_edges_are_invalid_for_every_actor(
			actor in arb_actor(),
			ticket in arb_ticket(),
			to in arb_status(),
		) {
			prop_assume!(to != ticket.status && !is_valid_transition(ticket.status, to));
			let before = ticket.clone();
			let err = update_status(&actor, &ticket, &StatusRequest::to(to).with_note("x"), now()).unwrap_err();
			prop_assert_eq!(err, PolicyError::InvalidTransition { from: ticket.status, to });
			prop_assert_eq!(ticket, before);
		}

		#[test]
		fn users_never_change_status(
			ticket in arb_ticket(),
			to in arb_status(),
			note in proptest::option::of("[a-z ]{0,12}"),
		) {
			let actor = Actor::member(ticket.requester_id, Role::User, ticket.organization_id);
			let request = StatusRequest { status: to, note };
			prop_assert!(update_status(&actor, &ticket, &request, now()).is_err());
		}

		#[test]
		fn unassigned_contractor_is_always_denied_on_real_edges(
			mut ticket in arb_ticket(),
			(from, to) in arb_edge(),
		) {
			ticket.status = from;
			let worker = Actor::member(UserId::generate(), Role::Contractor, ticket.organization_id);
			ticket.contractor_id = Some(UserId::generate());
			let err = update_status(&worker, &ticket, &StatusRequest::to(to), now()).unwrap_err();
			prop_assert!(matches!(err, PolicyError::Denied(_)), "got {:?}", err);
		}

		#[test]
		fn successful_outcomes_follow_an_edge(
			actor in arb_actor(),
			ticket in arb_ticket(),
			to in arb_status(),
		) {
			if let Ok(outcome) = update_status(&actor, &ticket, &StatusRequest::to(to), now()) {
				prop_assert!(is_valid_transition(ticket.status, outcome.ticket.status));
				prop_assert!(TicketStatus::all().contains(&outcome.ticket.status));
				prop_assert_eq!(outcome.update.ticket_id, ticket.id);
				prop_assert_eq!(outcome.ticket.organization_id, ticket.organization_id);
			}
		}
	}
}
