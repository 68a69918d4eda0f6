// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rules for creating profiles and organizations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::actor::{Actor, Profile};
use crate::capability::{self, Action, Target};
use crate::error::{PolicyError, Result};
use crate::types::{OrgId, Role, UserId};

const MAX_NAME_LEN: usize = 200;

/// A tenant. Tickets and non-super-admin profiles belong to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Organization {
	pub id: OrgId,
	pub name: String,
	pub domain: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
	pub email: String,
	pub full_name: String,
	pub role: Role,
	/// Org admins may omit this to mean their own organization.
	#[serde(default)]
	pub organization_id: Option<OrgId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganization {
	pub name: String,
	pub domain: String,
}

/// Validates a profile creation request and returns the profile to store.
#[instrument(skip(actor, new_profile, now), fields(actor_id = %actor.id, role = %new_profile.role))]
pub fn authorize_new_profile(
	actor: &Actor,
	new_profile: &NewProfile,
	now: DateTime<Utc>,
) -> Result<Profile> {
	let organization_id = match (actor.role, new_profile.organization_id) {
		(Role::OrgAdmin, None) => actor.organization_id,
		(_, org) => org,
	};

	capability::check(
		actor,
		Action::ManageUsers,
		Target::Member {
			organization_id,
			role: new_profile.role,
		},
	)?;

	ensure_role_has_org(new_profile.role, organization_id.is_some())?;
	let email = normalize_email(&new_profile.email)?;
	let full_name = required_name("full_name", &new_profile.full_name)?;

	Ok(Profile {
		id: UserId::generate(),
		organization_id,
		email,
		full_name,
		role: new_profile.role,
		created_at: now,
		updated_at: now,
	})
}

/// Validates an organization creation request.
#[instrument(skip(actor, new_org, now), fields(actor_id = %actor.id))]
pub fn create_organization(
	actor: &Actor,
	new_org: &NewOrganization,
	now: DateTime<Utc>,
) -> Result<Organization> {
	capability::check(actor, Action::ManageOrganizations, Target::None)?;

	let name = required_name("name", &new_org.name)?;
	let domain = normalize_domain(&new_org.domain)?;

	Ok(Organization {
		id: OrgId::generate(),
		name,
		domain,
		created_at: now,
		updated_at: now,
	})
}

/// Super admins belong to no organization; every other role needs one.
pub fn ensure_role_has_org(role: Role, has_org: bool) -> Result<()> {
	match (role, has_org) {
		(Role::SuperAdmin, true) => Err(PolicyError::validation(
			"super_admin profiles cannot belong to an organization",
		)),
		(Role::SuperAdmin, false) => Ok(()),
		(_, true) => Ok(()),
		(role, false) => Err(PolicyError::validation(format!(
			"organization_id is required for {role} profiles"
		))),
	}
}

fn required_name(field: &str, value: &str) -> Result<String> {
	let value = value.trim();
	if value.is_empty() {
		return Err(PolicyError::validation(format!("{field} is required")));
	}
	if value.chars().count() > MAX_NAME_LEN {
		return Err(PolicyError::validation(format!(
			"{field} must be at most {MAX_NAME_LEN} characters"
		)));
	}
	Ok(value.to_string())
}

fn normalize_email(email: &str) -> Result<String> {
	let email = email.trim().to_lowercase();
	let valid = match email.split_once('@') {
		Some((local, domain)) => {
			!local.is_empty()
				&& !domain.contains('@')
				&& domain.contains('.')
				&& !domain.starts_with('.')
				&& !domain.ends_with('.')
				&& !email.chars().any(char::is_whitespace)
		}
		None => false,
	};
	if valid {
		Ok(email)
	} else {
		Err(PolicyError::validation(format!("invalid email address: {email}")))
	}
}

fn normalize_domain(domain: &str) -> Result<String> {
	let domain = domain.trim().to_lowercase();
	let valid = domain.contains('.')
		&& !domain.starts_with('.')
		&& !domain.ends_with('.')
		&& domain
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
	if valid {
		Ok(domain)
	} else {
		Err(PolicyError::validation(format!("invalid domain: {domain}")))
	}
}
