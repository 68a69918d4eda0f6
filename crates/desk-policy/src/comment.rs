// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::actor::Actor;
use crate::capability::{self, Action, Target};
use crate::error::{PolicyError, Result};
use crate::ticket::{Ticket, TicketComment};
use crate::types::CommentId;

pub const MAX_COMMENT_LEN: usize = 4000;

/// Builds a comment on a ticket the actor can see.
#[instrument(skip(actor, ticket, body, now), fields(actor_id = %actor.id, ticket_id = %ticket.id))]
pub fn post_comment(
	actor: &Actor,
	ticket: &Ticket,
	body: &str,
	now: DateTime<Utc>,
) -> Result<TicketComment> {
	capability::check(actor, Action::PostComment, Target::Ticket(ticket))?;

	let body = body.trim();
	if body.is_empty() {
		return Err(PolicyError::validation("message body must not be empty"));
	}
	if body.chars().count() > MAX_COMMENT_LEN {
		return Err(PolicyError::validation(format!(
			"message body must be at most {MAX_COMMENT_LEN} characters"
		)));
	}

	Ok(TicketComment {
		id: CommentId::generate(),
		ticket_id: ticket.id,
		organization_id: ticket.organization_id,
		author_id: actor.id,
		body: body.to_string(),
		created_at: now,
	})
}
