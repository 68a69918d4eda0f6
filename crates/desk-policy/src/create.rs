// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::actor::Actor;
use crate::capability::{self, Action, Target};
use crate::error::{DenyReason, PolicyError, Result};
use crate::ticket::{Ticket, TicketCategory, TicketPriority, TicketStatus, TicketUpdate, UpdateType};
use crate::types::TicketId;

pub const TITLE_MIN_LEN: usize = 5;
pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MIN_LEN: usize = 10;

/// Fields supplied by the requester when raising a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
	pub title: String,
	pub description: String,
	#[serde(default = "default_priority")]
	pub priority: TicketPriority,
	#[serde(default = "default_category")]
	pub category: TicketCategory,
	#[serde(default)]
	pub site_location: Option<String>,
}

fn default_priority() -> TicketPriority {
	TicketPriority::Medium
}

fn default_category() -> TicketCategory {
	TicketCategory::General
}

/// A freshly created ticket and its `created` history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTicket {
	pub ticket: Ticket,
	pub update: TicketUpdate,
}

/// Creates an `open` ticket in the actor's organization.
///
/// The returned ticket has version 0; the store assigns the first persisted
/// version.
#[instrument(skip(actor, new_ticket, now), fields(actor_id = %actor.id))]
pub fn create_ticket(actor: &Actor, new_ticket: &NewTicket, now: DateTime<Utc>) -> Result<CreatedTicket> {
	capability::check(actor, Action::CreateTicket, Target::None)?;
	let organization_id = actor
		.organization_id
		.ok_or(PolicyError::Denied(DenyReason::NoOrganization))?;

	let title = new_ticket.title.trim();
	let title_len = title.chars().count();
	if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&title_len) {
		return Err(PolicyError::validation(format!(
			"title must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters"
		)));
	}

	let description = new_ticket.description.trim();
	if description.chars().count() < DESCRIPTION_MIN_LEN {
		return Err(PolicyError::validation(format!(
			"description must be at least {DESCRIPTION_MIN_LEN} characters"
		)));
	}

	let site_location = new_ticket
		.site_location
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string);

	let ticket = Ticket {
		id: TicketId::generate(),
		organization_id,
		title: title.to_string(),
		description: description.to_string(),
		status: TicketStatus::Open,
		priority: new_ticket.priority,
		category: new_ticket.category,
		site_location,
		requester_id: actor.id,
		admin_id: None,
		contractor_id: None,
		contractor_name: None,
		estimated_duration: None,
		scheduled_arrival: None,
		created_at: now,
		updated_at: now,
		version: 0,
	};

	let update = TicketUpdate::record(ticket.id, UpdateType::Created, actor.id, now)
		.with_statuses(None, TicketStatus::Open);

	Ok(CreatedTicket { ticket, update })
}
