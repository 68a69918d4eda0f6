// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profiles, organizations, break-glass access and the audit trail.

use std::sync::Arc;

use chrono::Utc;
use desk_policy::{
	self as policy, Action, Actor, AuditEventType, AuditLogEntry, NewOrganization, NewProfile,
	OrgId, Organization, Profile, Role, Target, TicketId,
};
use desk_server_db::{OrgStore, ProfileStore, TicketStore};

use crate::audit::AuditRecorder;
use crate::error::ServerError;

pub struct DirectoryService {
	profiles: Arc<dyn ProfileStore>,
	orgs: Arc<dyn OrgStore>,
	tickets: Arc<dyn TicketStore>,
	audit: AuditRecorder,
}

impl DirectoryService {
	pub fn new(
		profiles: Arc<dyn ProfileStore>,
		orgs: Arc<dyn OrgStore>,
		tickets: Arc<dyn TicketStore>,
		audit: AuditRecorder,
	) -> Self {
		Self {
			profiles,
			orgs,
			tickets,
			audit,
		}
	}

	#[tracing::instrument(skip(self, actor, new_profile), fields(actor_id = %actor.id, role = %new_profile.role))]
	pub async fn create_profile(
		&self,
		actor: &Actor,
		new_profile: &NewProfile,
	) -> Result<Profile, ServerError> {
		let profile = match policy::authorize_new_profile(actor, new_profile, Utc::now()) {
			Ok(profile) => profile,
			Err(e) => return Err(self.audit.refused(actor, Action::ManageUsers, None, e).await),
		};

		if let Some(org_id) = profile.organization_id {
			if self.orgs.get_org(&org_id).await?.is_none() {
				return Err(ServerError::NotFound(format!("organization {org_id}")));
			}
		}

		self.profiles.create_profile(&profile).await?;
		tracing::info!(user_id = %profile.id, role = %profile.role, "profile created");

		let mut entry = AuditLogEntry::builder(AuditEventType::ProfileCreated)
			.actor(actor)
			.resource("profile", profile.id)
			.action(Action::ManageUsers.as_str())
			.details(serde_json::json!({ "role": profile.role.as_str() }));
		if let Some(org_id) = profile.organization_id {
			entry = entry.organization(org_id);
		}
		self.audit.record(entry.build()).await;

		Ok(profile)
	}

	/// Super admins see every profile, or one organization's when
	/// `organization_id` is given. Org admins see their own organization.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id))]
	pub async fn list_profiles(
		&self,
		actor: &Actor,
		organization_id: Option<OrgId>,
	) -> Result<Vec<Profile>, ServerError> {
		let organization_id = match (actor.role, organization_id) {
			(Role::OrgAdmin, None) => actor.organization_id,
			(_, org) => org,
		};

		let target = match (actor.role, organization_id) {
			(Role::SuperAdmin, _) => Target::None,
			(_, org) => Target::Organization(org),
		};
		if let Err(e) = policy::check(actor, Action::ManageUsers, target) {
			return Err(self.audit.refused(actor, Action::ManageUsers, None, e).await);
		}

		Ok(self.profiles.list_profiles(organization_id).await?)
	}

	#[tracing::instrument(skip(self, actor, new_org), fields(actor_id = %actor.id))]
	pub async fn create_organization(
		&self,
		actor: &Actor,
		new_org: &NewOrganization,
	) -> Result<Organization, ServerError> {
		let org = match policy::create_organization(actor, new_org, Utc::now()) {
			Ok(org) => org,
			Err(e) => {
				return Err(self
					.audit
					.refused(actor, Action::ManageOrganizations, None, e)
					.await)
			}
		};

		self.orgs.create_org(&org).await?;
		tracing::info!(org_id = %org.id, domain = %org.domain, "organization created");

		self.audit
			.record(
				AuditLogEntry::builder(AuditEventType::OrgCreated)
					.actor(actor)
					.organization(org.id)
					.resource("organization", org.id)
					.action(Action::ManageOrganizations.as_str())
					.details(serde_json::json!({ "domain": org.domain }))
					.build(),
			)
			.await;

		Ok(org)
	}

	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id))]
	pub async fn list_organizations(&self, actor: &Actor) -> Result<Vec<Organization>, ServerError> {
		if let Err(e) = policy::check(actor, Action::ManageOrganizations, Target::None) {
			return Err(self
				.audit
				.refused(actor, Action::ManageOrganizations, None, e)
				.await);
		}
		Ok(self.orgs.list_orgs().await?)
	}

	/// Records an explicit emergency access. Unlike other audit writes, a
	/// failure to store the entry fails the request.
	#[tracing::instrument(skip(self, actor, reason), fields(actor_id = %actor.id))]
	pub async fn break_glass(
		&self,
		actor: &Actor,
		reason: &str,
		ticket_id: Option<TicketId>,
	) -> Result<AuditLogEntry, ServerError> {
		if let Err(e) = policy::check(actor, Action::BreakGlass, Target::None) {
			return Err(self.audit.refused(actor, Action::BreakGlass, None, e).await);
		}

		let ticket = match ticket_id {
			Some(id) => Some(
				self.tickets
					.get_ticket(&id)
					.await?
					.ok_or_else(|| ServerError::NotFound(format!("ticket {id}")))?,
			),
			None => None,
		};

		let entry = match policy::break_glass(actor, reason, ticket.as_ref(), Utc::now()) {
			Ok(entry) => entry,
			Err(e) => {
				return Err(self
					.audit
					.refused(actor, Action::BreakGlass, ticket.as_ref(), e)
					.await)
			}
		};

		self.audit.store().record(&entry).await?;
		Ok(entry)
	}

	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id))]
	pub async fn audit_logs(
		&self,
		actor: &Actor,
		event_type: Option<AuditEventType>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<AuditLogEntry>, i64), ServerError> {
		if let Err(e) = policy::check(actor, Action::ManageOrganizations, Target::None) {
			return Err(self
				.audit
				.refused(actor, Action::ManageOrganizations, None, e)
				.await);
		}
		Ok(self.audit.store().query_logs(event_type, limit, offset).await?)
	}
}
