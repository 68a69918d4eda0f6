// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Best-effort audit logging for handlers and services.

use std::sync::Arc;

use desk_policy::{Action, Actor, AuditLogEntry, PolicyError, Ticket};
use desk_server_db::AuditStore;

use crate::error::ServerError;

/// Writes audit entries without ever failing the request that produced them.
#[derive(Clone)]
pub struct AuditRecorder {
	store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
	pub fn new(store: Arc<dyn AuditStore>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<dyn AuditStore> {
		&self.store
	}

	pub async fn record(&self, entry: AuditLogEntry) {
		if let Err(e) = self.store.record(&entry).await {
			tracing::warn!(
				error = %e,
				event_type = %entry.event_type,
				action = %entry.action,
				"failed to write audit log entry"
			);
		}
	}

	/// Converts a policy refusal into a [`ServerError`]. Access denials are
	/// logged at warn and audited.
	pub async fn refused(
		&self,
		actor: &Actor,
		action: Action,
		ticket: Option<&Ticket>,
		err: PolicyError,
	) -> ServerError {
		match err {
			PolicyError::Denied(_) | PolicyError::CrossOrgAssignmentDenied => {
				tracing::warn!(
					actor_id = %actor.id,
					role = %actor.role,
					%action,
					ticket_id = ?ticket.map(|t| t.id),
					code = err.code(),
					error = %err,
					"access denied"
				);
				let mut builder = AuditLogEntry::access_denied(actor, action, &err);
				if let Some(ticket) = ticket {
					builder = builder.ticket(ticket);
				}
				self.record(builder.build()).await;
			}
			_ => {
				tracing::debug!(actor_id = %actor.id, %action, code = err.code(), error = %err, "request rejected");
			}
		}
		err.into()
	}
}
