// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ticket service: the caller of the policy engine.
//!
//! Every mutation is a fetch, decide, persist cycle. The persist step is a
//! compare-and-swap on the ticket version; when another writer got there
//! first the whole cycle runs again against the fresh ticket, up to the
//! configured number of attempts. Notifications are emitted after the write
//! commits and their failure never fails the request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use desk_policy::{
	self as policy, Action, Actor, AssignRequest, AuditEventType, AuditLogEntry, NewTicket,
	NotificationIntent, PolicyError, Role, StatusRequest, Target, Ticket, TicketCategory,
	TicketComment, TicketId, TicketPriority, TicketStatus, TicketUpdate, UserId,
};
use desk_server_db::{CommentStore, NotificationSink, ProfileStore, TicketQuery, TicketStore};

use crate::audit::AuditRecorder;
use crate::error::ServerError;

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// A decided mutation waiting to be persisted.
struct Mutation {
	ticket: Ticket,
	update: TicketUpdate,
	notification: Option<NotificationIntent>,
}

impl From<policy::StatusOutcome> for Mutation {
	fn from(outcome: policy::StatusOutcome) -> Self {
		Self {
			ticket: outcome.ticket,
			update: outcome.update,
			notification: outcome.notification,
		}
	}
}

impl From<policy::Assignment> for Mutation {
	fn from(assignment: policy::Assignment) -> Self {
		Self {
			ticket: assignment.ticket,
			update: assignment.update,
			notification: Some(assignment.notification),
		}
	}
}

/// Listing filters, already clamped.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
	pub status: Option<TicketStatus>,
	pub priority: Option<TicketPriority>,
	pub category: Option<TicketCategory>,
	pub limit: u32,
	pub offset: u32,
}

pub struct TicketService {
	tickets: Arc<dyn TicketStore>,
	comments: Arc<dyn CommentStore>,
	profiles: Arc<dyn ProfileStore>,
	notifier: Option<Arc<dyn NotificationSink>>,
	audit: AuditRecorder,
	retry_attempts: u32,
}

impl TicketService {
	pub fn new(
		tickets: Arc<dyn TicketStore>,
		comments: Arc<dyn CommentStore>,
		profiles: Arc<dyn ProfileStore>,
		audit: AuditRecorder,
	) -> Self {
		Self {
			tickets,
			comments,
			profiles,
			notifier: None,
			audit,
			retry_attempts: DEFAULT_RETRY_ATTEMPTS,
		}
	}

	/// Record notification intents through `notifier`. Without one,
	/// notifications are dropped.
	pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
		self.retry_attempts = attempts.max(1);
		self
	}

	#[tracing::instrument(skip(self, actor, new_ticket), fields(actor_id = %actor.id))]
	pub async fn create(&self, actor: &Actor, new_ticket: &NewTicket) -> Result<Ticket, ServerError> {
		let created = match policy::create_ticket(actor, new_ticket, Utc::now()) {
			Ok(created) => created,
			Err(e) => return Err(self.audit.refused(actor, Action::CreateTicket, None, e).await),
		};

		let ticket = self
			.tickets
			.create_ticket(&created.ticket, &created.update)
			.await?;
		tracing::info!(ticket_id = %ticket.id, org_id = %ticket.organization_id, "ticket created");

		self.notify_org_admins(&ticket).await;
		Ok(ticket)
	}

	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, ticket_id = %id))]
	pub async fn get(&self, actor: &Actor, id: TicketId) -> Result<Ticket, ServerError> {
		let ticket = self.fetch(id).await?;
		self.require(actor, Action::ViewTicket, &ticket).await?;
		Ok(ticket)
	}

	/// Tickets the actor may see, newest first, and the total count.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id))]
	pub async fn list(
		&self,
		actor: &Actor,
		filter: TicketFilter,
	) -> Result<(Vec<Ticket>, u64), ServerError> {
		let query = TicketQuery {
			scope: policy::visibility_scope(actor),
			status: filter.status,
			priority: filter.priority,
			category: filter.category,
			limit: filter.limit,
			offset: filter.offset,
		};
		Ok(self.tickets.list_tickets(&query).await?)
	}

	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, ticket_id = %id))]
	pub async fn history(&self, actor: &Actor, id: TicketId) -> Result<Vec<TicketUpdate>, ServerError> {
		let ticket = self.get(actor, id).await?;
		Ok(self.tickets.list_updates(&ticket.id).await?)
	}

	#[tracing::instrument(skip(self, actor, request), fields(actor_id = %actor.id, ticket_id = %id, to = %request.status))]
	pub async fn change_status(
		&self,
		actor: &Actor,
		id: TicketId,
		request: &StatusRequest,
	) -> Result<Ticket, ServerError> {
		self.mutate(actor, id, Action::UpdateStatus, |ticket, now| {
			policy::update_status(actor, ticket, request, now).map(Mutation::from)
		})
		.await
	}

	#[tracing::instrument(skip(self, actor, request), fields(actor_id = %actor.id, ticket_id = %id))]
	pub async fn assign(
		&self,
		actor: &Actor,
		id: TicketId,
		contractor_id: UserId,
		request: &AssignRequest,
	) -> Result<Ticket, ServerError> {
		// Authorize before resolving the contractor so callers cannot enumerate user ids.
		let current = self.fetch(id).await?;
		self.require(actor, Action::AssignContractor, &current).await?;

		let candidate = self
			.profiles
			.get_profile(&contractor_id)
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("contractor {contractor_id}")))?;

		let ticket = self
			.mutate(actor, id, Action::AssignContractor, |ticket, now| {
				policy::assign(actor, ticket, &candidate, request, now).map(Mutation::from)
			})
			.await?;

		self.audit
			.record(
				AuditLogEntry::builder(AuditEventType::ContractorAssigned)
					.actor(actor)
					.ticket(&ticket)
					.action(Action::AssignContractor.as_str())
					.details(serde_json::json!({
						"contractor_id": candidate.id.to_string(),
						"contractor_org_id": candidate.organization_id.map(|o| o.to_string()),
					}))
					.build(),
			)
			.await;
		Ok(ticket)
	}

	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, ticket_id = %id))]
	pub async fn unassign(&self, actor: &Actor, id: TicketId) -> Result<Ticket, ServerError> {
		let mut removed = None;
		let ticket = self
			.mutate(actor, id, Action::UnassignContractor, |ticket, now| {
				removed = ticket.contractor_id;
				policy::unassign(actor, ticket, now).map(Mutation::from)
			})
			.await?;

		self.audit
			.record(
				AuditLogEntry::builder(AuditEventType::ContractorUnassigned)
					.actor(actor)
					.ticket(&ticket)
					.action(Action::UnassignContractor.as_str())
					.details(serde_json::json!({
						"contractor_id": removed.map(|id| id.to_string()),
					}))
					.build(),
			)
			.await;
		Ok(ticket)
	}

	#[tracing::instrument(skip(self, actor, body), fields(actor_id = %actor.id, ticket_id = %id))]
	pub async fn post_comment(
		&self,
		actor: &Actor,
		id: TicketId,
		body: &str,
	) -> Result<TicketComment, ServerError> {
		let ticket = self.fetch(id).await?;
		let comment = match policy::post_comment(actor, &ticket, body, Utc::now()) {
			Ok(comment) => comment,
			Err(e) => {
				return Err(self
					.audit
					.refused(actor, Action::PostComment, Some(&ticket), e)
					.await)
			}
		};
		self.comments.create_comment(&comment).await?;
		Ok(comment)
	}

	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, ticket_id = %id))]
	pub async fn comments(&self, actor: &Actor, id: TicketId) -> Result<Vec<TicketComment>, ServerError> {
		let ticket = self.get(actor, id).await?;
		Ok(self.comments.list_comments(&ticket.id).await?)
	}

	async fn fetch(&self, id: TicketId) -> Result<Ticket, ServerError> {
		self.tickets
			.get_ticket(&id)
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("ticket {id}")))
	}

	async fn require(&self, actor: &Actor, action: Action, ticket: &Ticket) -> Result<(), ServerError> {
		match policy::check(actor, action, Target::Ticket(ticket)) {
			Ok(()) => Ok(()),
			Err(e) => Err(self.audit.refused(actor, action, Some(ticket), e).await),
		}
	}

	/// Runs fetch, decide, persist until the write lands or attempts run out.
	async fn mutate<F>(
		&self,
		actor: &Actor,
		id: TicketId,
		action: Action,
		mut decide: F,
	) -> Result<Ticket, ServerError>
	where
		F: FnMut(&Ticket, DateTime<Utc>) -> Result<Mutation, PolicyError>,
	{
		for attempt in 1..=self.retry_attempts {
			let current = self.fetch(id).await?;
			let mutation = match decide(&current, Utc::now()) {
				Ok(mutation) => mutation,
				Err(e) => return Err(self.audit.refused(actor, action, Some(&current), e).await),
			};

			match self
				.tickets
				.persist(&mutation.ticket, current.version, &mutation.update)
				.await
			{
				Ok(stored) => {
					tracing::info!(
						ticket_id = %stored.id,
						update_type = %mutation.update.update_type,
						status = %stored.status,
						version = stored.version,
						attempt,
						"ticket updated"
					);
					if let Some(intent) = mutation.notification {
						self.emit(&intent).await;
					}
					return Ok(stored);
				}
				Err(e) if e.is_conflict() => {
					tracing::debug!(attempt, error = %e, "ticket version conflict, retrying");
				}
				Err(e) => return Err(e.into()),
			}
		}

		tracing::warn!(ticket_id = %id, attempts = self.retry_attempts, "giving up after repeated version conflicts");
		Err(ServerError::Conflict(format!(
			"ticket {id} was modified concurrently; gave up after {} attempts",
			self.retry_attempts
		)))
	}

	async fn emit(&self, intent: &NotificationIntent) {
		let Some(notifier) = &self.notifier else {
			tracing::debug!(user_id = %intent.user_id, "notifications disabled, dropping intent");
			return;
		};
		if let Err(e) = notifier.emit(intent).await {
			tracing::warn!(
				error = %e,
				user_id = %intent.user_id,
				ticket_id = %intent.ticket_id,
				"failed to record notification"
			);
		}
	}

	async fn notify_org_admins(&self, ticket: &Ticket) {
		if self.notifier.is_none() {
			return;
		}
		let admins = match self.profiles.list_profiles(Some(ticket.organization_id)).await {
			Ok(profiles) => profiles,
			Err(e) => {
				tracing::warn!(error = %e, ticket_id = %ticket.id, "failed to look up organization admins");
				return;
			}
		};
		for admin in admins.iter().filter(|p| p.role == Role::OrgAdmin) {
			let intent = NotificationIntent::email(
				admin.id,
				ticket,
				format!("New {} ticket: \"{}\"", ticket.priority, ticket.title),
			);
			self.emit(&intent).await;
		}
	}
}
