// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use desk_policy::{AuditLogEntry, TicketId};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// Emergency access request. The reason is stored in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BreakGlassRequest {
	pub reason: String,
	#[serde(default)]
	pub ticket_id: Option<TicketId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AuditLogEntryResponse {
	pub id: String,
	pub timestamp: DateTime<Utc>,
	pub event_type: String,
	pub actor_user_id: Option<String>,
	pub organization_id: Option<String>,
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,
	pub action: String,
	pub details: serde_json::Value,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
	fn from(entry: AuditLogEntry) -> Self {
		Self {
			id: entry.id.to_string(),
			timestamp: entry.timestamp,
			event_type: entry.event_type.to_string(),
			actor_user_id: entry.actor_user_id.map(|id| id.to_string()),
			organization_id: entry.organization_id.map(|id| id.to_string()),
			resource_type: entry.resource_type,
			resource_id: entry.resource_id,
			action: entry.action,
			details: entry.details,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct ListAuditLogsParams {
	/// e.g. `access_denied`, `break_glass`.
	pub event_type: Option<String>,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListAuditLogsResponse {
	pub logs: Vec<AuditLogEntryResponse>,
	pub total: i64,
	pub limit: i64,
	pub offset: i64,
}
