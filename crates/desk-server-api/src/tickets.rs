// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use desk_policy::{
	AssignRequest, NewTicket, StatusRequest, Ticket, TicketCategory, TicketComment, TicketPriority,
	TicketStatus, TicketUpdate, UserId,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// Request to raise a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateTicketRequest {
	pub title: String,
	pub description: String,
	/// Defaults to `medium`.
	#[serde(default)]
	pub priority: Option<TicketPriority>,
	/// Defaults to `general`.
	#[serde(default)]
	pub category: Option<TicketCategory>,
	#[serde(default)]
	pub site_location: Option<String>,
}

impl From<CreateTicketRequest> for NewTicket {
	fn from(req: CreateTicketRequest) -> Self {
		NewTicket {
			title: req.title,
			description: req.description,
			priority: req.priority.unwrap_or(TicketPriority::Medium),
			category: req.category.unwrap_or(TicketCategory::General),
			site_location: req.site_location,
		}
	}
}

/// Request to move a ticket to another status, or to leave a note without
/// moving it (`status` equal to the current status plus a `note`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateStatusRequest {
	pub status: TicketStatus,
	#[serde(default)]
	pub note: Option<String>,
}

impl From<UpdateStatusRequest> for StatusRequest {
	fn from(req: UpdateStatusRequest) -> Self {
		StatusRequest {
			status: req.status,
			note: req.note,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AssignContractorRequest {
	pub contractor_id: UserId,
	/// Minutes.
	#[serde(default)]
	pub estimated_duration: Option<u32>,
	#[serde(default)]
	pub scheduled_arrival: Option<DateTime<Utc>>,
}

impl AssignContractorRequest {
	pub fn schedule(&self) -> AssignRequest {
		AssignRequest {
			estimated_duration: self.estimated_duration,
			scheduled_arrival: self.scheduled_arrival,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PostMessageRequest {
	pub message: String,
}

/// Query parameters for `GET /api/tickets`. Pages are 1-based.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct ListTicketsParams {
	pub status: Option<TicketStatus>,
	pub priority: Option<TicketPriority>,
	pub category: Option<TicketCategory>,
	pub page: Option<u32>,
	pub limit: Option<u32>,
}

impl ListTicketsParams {
	pub fn limit_clamped(&self, default: u32, max: u32) -> u32 {
		self.limit.unwrap_or(default).min(max).max(1)
	}

	pub fn page_or_default(&self) -> u32 {
		self.page.unwrap_or(1).max(1)
	}

	pub fn offset(&self, limit: u32) -> u32 {
		(self.page_or_default() - 1).saturating_mul(limit)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListTicketsResponse {
	pub tickets: Vec<Ticket>,
	pub total: u64,
	pub page: u32,
	pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListUpdatesResponse {
	pub updates: Vec<TicketUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListMessagesResponse {
	pub messages: Vec<TicketComment>,
}
