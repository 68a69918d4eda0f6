// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tickets and the records that hang off them.
//!
//! - [`Ticket`]: the unit of work, owned by exactly one organization
//! - [`TicketUpdate`]: append-only history entry, one per accepted mutation
//! - [`TicketComment`]: free-text message posted on a ticket
//! - [`NotificationIntent`]: a request to notify someone, delivered externally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{CommentId, OrgId, TicketId, TicketUpdateId, UserId};

macro_rules! labelled_enum {
	(
		$(#[$meta:meta])*
		$name:ident, $kind:literal {
			$($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		pub enum $name {
			$($(#[$vmeta])* #[serde(rename = $label)] $variant),+
		}

		impl $name {
			pub fn all() -> &'static [$name] {
				&[$($name::$variant),+]
			}

			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $label),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = ParseError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s {
					$($label => Ok($name::$variant),)+
					other => Err(ParseError::unknown($kind, other)),
				}
			}
		}
	};
}

labelled_enum! {
	/// Lifecycle status of a ticket. `Closed` and `Cancelled` are terminal.
	TicketStatus, "ticket status" {
		Open => "open",
		Assigned => "assigned",
		Accepted => "accepted",
		InProgress => "in_progress",
		Completed => "completed",
		Closed => "closed",
		Cancelled => "cancelled",
	}
}

impl TicketStatus {
	/// Terminal statuses have no outbound transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
	}
}

labelled_enum! {
	TicketPriority, "ticket priority" {
		Low => "low",
		Medium => "medium",
		High => "high",
		Urgent => "urgent",
	}
}

labelled_enum! {
	/// Fixed set of ticket categories.
	TicketCategory, "ticket category" {
		It => "IT",
		Maintenance => "maintenance",
		Projects => "projects",
		Sales => "sales",
		Stores => "stores",
		General => "general",
	}
}

labelled_enum! {
	/// Kind of history entry recorded in [`TicketUpdate`].
	UpdateType, "update type" {
		Created => "created",
		Assigned => "assigned",
		Unassigned => "unassigned",
		Accepted => "accepted",
		/// The assigned contractor declined the work.
		Rejected => "rejected",
		InProgress => "in_progress",
		Completed => "completed",
		Closed => "closed",
		Cancelled => "cancelled",
		/// A note recorded without a status change.
		Comment => "comment",
	}
}

labelled_enum! {
	NotificationChannel, "notification channel" {
		Email => "email",
		Sms => "sms",
		Whatsapp => "whatsapp",
		Push => "push",
	}
}

impl Default for NotificationChannel {
	fn default() -> Self {
		NotificationChannel::Email
	}
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Ticket {
	pub id: TicketId,
	pub organization_id: OrgId,
	pub title: String,
	pub description: String,
	pub status: TicketStatus,
	pub priority: TicketPriority,
	pub category: TicketCategory,
	pub site_location: Option<String>,
	pub requester_id: UserId,
	pub admin_id: Option<UserId>,
	pub contractor_id: Option<UserId>,
	pub contractor_name: Option<String>,
	/// Estimated duration of the work in minutes.
	pub estimated_duration: Option<u32>,
	pub scheduled_arrival: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	/// Optimistic concurrency token, advanced by the store on every write.
	pub version: u64,
}

impl Ticket {
	pub fn is_requester(&self, user_id: UserId) -> bool {
		self.requester_id == user_id
	}

	pub fn is_assigned_to(&self, user_id: UserId) -> bool {
		self.contractor_id == Some(user_id)
	}
}

/// Append-only history entry for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TicketUpdate {
	pub id: TicketUpdateId,
	pub ticket_id: TicketId,
	pub update_type: UpdateType,
	pub old_status: Option<TicketStatus>,
	pub new_status: Option<TicketStatus>,
	pub actor_id: UserId,
	pub note: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl TicketUpdate {
	pub(crate) fn record(
		ticket_id: TicketId,
		update_type: UpdateType,
		actor_id: UserId,
		now: DateTime<Utc>,
	) -> Self {
		Self {
			id: TicketUpdateId::generate(),
			ticket_id,
			update_type,
			old_status: None,
			new_status: None,
			actor_id,
			note: None,
			created_at: now,
		}
	}

	pub(crate) fn with_statuses(mut self, old: Option<TicketStatus>, new: TicketStatus) -> Self {
		self.old_status = old;
		self.new_status = Some(new);
		self
	}

	pub(crate) fn with_note(mut self, note: Option<String>) -> Self {
		self.note = note;
		self
	}
}

/// A message posted on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TicketComment {
	pub id: CommentId,
	pub ticket_id: TicketId,
	pub organization_id: OrgId,
	pub author_id: UserId,
	pub body: String,
	pub created_at: DateTime<Utc>,
}

/// A notification the service wants delivered. Delivery is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
	pub user_id: UserId,
	pub ticket_id: TicketId,
	pub organization_id: OrgId,
	pub message: String,
	pub channel: NotificationChannel,
}

impl NotificationIntent {
	pub fn email(user_id: UserId, ticket: &Ticket, message: impl Into<String>) -> Self {
		Self {
			user_id,
			ticket_id: ticket.id,
			organization_id: ticket.organization_id,
			message: message.into(),
			channel: NotificationChannel::Email,
		}
	}
}
