// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ticket policy engine for the Desk help-desk service.
//!
//! This crate decides, without performing any I/O, whether an actor may do
//! something to a ticket and what the ticket looks like afterwards:
//!
//! - [`capability`]: the role capability table and listing visibility
//! - [`transition`]: the ticket status graph
//! - [`assignment`]: contractor assignment and unassignment rules
//! - [`create`], [`comment`], [`users`]: ticket creation, comments, profile
//!   and organization management
//! - [`audit`]: audit records, including explicit break-glass access
//!
//! Callers fetch the actor and ticket first, call into the engine, then
//! persist the returned ticket together with its [`TicketUpdate`]. Timestamps
//! are passed in so decisions are deterministic.

pub mod actor;
pub mod assignment;
pub mod audit;
pub mod capability;
pub mod comment;
pub mod create;
pub mod error;
pub mod ticket;
pub mod transition;
pub mod types;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use actor::{Actor, Profile};
pub use assignment::{assign, unassign, AssignRequest, Assignment};
pub use audit::{break_glass, AuditEventType, AuditLogBuilder, AuditLogEntry};
pub use capability::{
	check, evaluate, is_allowed, is_ticket_admin, visibility_scope, Action, Decision, Target,
	TicketScope,
};
pub use comment::post_comment;
pub use create::{create_ticket, CreatedTicket, NewTicket};
pub use error::{DenyReason, ParseError, PolicyError, Result};
pub use ticket::{
	NotificationChannel, NotificationIntent, Ticket, TicketCategory, TicketComment, TicketPriority,
	TicketStatus, TicketUpdate, UpdateType,
};
pub use transition::{is_valid_transition, next_statuses, update_status, StatusOutcome, StatusRequest};
pub use types::{AuditId, CommentId, OrgId, Role, TicketId, TicketUpdateId, UserId};
pub use users::{authorize_new_profile, create_organization, NewOrganization, NewProfile, Organization};
