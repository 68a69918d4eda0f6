// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit records for denials, administrative changes and break-glass access.
//!
//! Ticket history lives in [`crate::TicketUpdate`]; this log covers the
//! security-relevant events around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{instrument, warn};

use crate::actor::Actor;
use crate::capability::{self, Action, Target};
use crate::error::{PolicyError, Result};
use crate::ticket::Ticket;
use crate::types::{AuditId, OrgId, UserId};

const MAX_REASON_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	/// A capability or rule check refused an action.
	AccessDenied,
	/// A super admin invoked emergency access.
	BreakGlass,
	ProfileCreated,
	OrgCreated,
	ContractorAssigned,
	ContractorUnassigned,
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditEventType::AccessDenied => "access_denied",
			AuditEventType::BreakGlass => "break_glass",
			AuditEventType::ProfileCreated => "profile_created",
			AuditEventType::OrgCreated => "org_created",
			AuditEventType::ContractorAssigned => "contractor_assigned",
			AuditEventType::ContractorUnassigned => "contractor_unassigned",
		};
		write!(f, "{s}")
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
	pub id: AuditId,
	pub timestamp: DateTime<Utc>,
	pub event_type: AuditEventType,
	pub actor_user_id: Option<UserId>,
	pub organization_id: Option<OrgId>,
	/// e.g. "ticket", "profile", "organization".
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,
	pub action: String,
	pub details: serde_json::Value,
}

impl AuditLogEntry {
	pub fn builder(event_type: AuditEventType) -> AuditLogBuilder {
		AuditLogBuilder::new(event_type)
	}

	/// Records a refused action.
	pub fn access_denied(actor: &Actor, action: Action, error: &PolicyError) -> AuditLogBuilder {
		AuditLogBuilder::new(AuditEventType::AccessDenied)
			.actor(actor)
			.action(action.as_str())
			.details(serde_json::json!({
				"code": error.code(),
				"message": error.to_string(),
				"role": actor.role.as_str(),
			}))
	}
}

/// Fluent builder for [`AuditLogEntry`].
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
	event_type: AuditEventType,
	timestamp: Option<DateTime<Utc>>,
	actor_user_id: Option<UserId>,
	organization_id: Option<OrgId>,
	resource_type: Option<String>,
	resource_id: Option<String>,
	action: Option<String>,
	details: serde_json::Value,
}

impl AuditLogBuilder {
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			timestamp: None,
			actor_user_id: None,
			organization_id: None,
			resource_type: None,
			resource_id: None,
			action: None,
			details: serde_json::Value::Null,
		}
	}

	/// Sets the acting user and, unless already set, their organization.
	pub fn actor(mut self, actor: &Actor) -> Self {
		self.actor_user_id = Some(actor.id);
		if self.organization_id.is_none() {
			self.organization_id = actor.organization_id;
		}
		self
	}

	pub fn organization(mut self, organization_id: OrgId) -> Self {
		self.organization_id = Some(organization_id);
		self
	}

	pub fn resource(
		mut self,
		resource_type: impl Into<String>,
		resource_id: impl ToString,
	) -> Self {
		self.resource_type = Some(resource_type.into());
		self.resource_id = Some(resource_id.to_string());
		self
	}

	/// Points the entry at a ticket and its organization.
	pub fn ticket(self, ticket: &Ticket) -> Self {
		self.resource("ticket", ticket.id).organization(ticket.organization_id)
	}

	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = Some(timestamp);
		self
	}

	pub fn build(self) -> AuditLogEntry {
		AuditLogEntry {
			id: AuditId::generate(),
			timestamp: self.timestamp.unwrap_or_else(Utc::now),
			event_type: self.event_type,
			actor_user_id: self.actor_user_id,
			organization_id: self.organization_id,
			resource_type: self.resource_type,
			resource_id: self.resource_id,
			action: self.action.unwrap_or_else(|| self.event_type.to_string()),
			details: self.details,
		}
	}
}

/// Authorizes emergency access and returns the audit entry that must be
/// written for it.
///
/// Break-glass grants nothing beyond the super admin row of the capability
/// table. It exists so emergency access is explicit and always leaves a
/// record with a reason.
#[instrument(skip(actor, reason, ticket, now), fields(actor_id = %actor.id))]
pub fn break_glass(
	actor: &Actor,
	reason: &str,
	ticket: Option<&Ticket>,
	now: DateTime<Utc>,
) -> Result<AuditLogEntry> {
	capability::check(actor, Action::BreakGlass, Target::None)?;

	let reason = reason.trim();
	if reason.is_empty() {
		return Err(PolicyError::validation("break-glass reason is required"));
	}
	if reason.chars().count() > MAX_REASON_LEN {
		return Err(PolicyError::validation(format!(
			"break-glass reason must be at most {MAX_REASON_LEN} characters"
		)));
	}

	let mut builder = AuditLogBuilder::new(AuditEventType::BreakGlass)
		.actor(actor)
		.action(Action::BreakGlass.as_str())
		.details(serde_json::json!({ "reason": reason }))
		.at(now);
	if let Some(ticket) = ticket {
		builder = builder.ticket(ticket);
	}

	warn!(ticket_id = ?ticket.map(|t| t.id), "break-glass access invoked");
	Ok(builder.build())
}
