// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Actors and the persisted profiles they are resolved from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrgId, Role, UserId};

/// The authenticated caller of an operation.
///
/// Built from a [`Profile`] for the duration of one request and never
/// persisted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
	pub id: UserId,
	pub role: Role,
	pub organization_id: Option<OrgId>,
}

impl Actor {
	/// A platform super admin. Super admins belong to no organization.
	pub fn super_admin(id: UserId) -> Self {
		Self {
			id,
			role: Role::SuperAdmin,
			organization_id: None,
		}
	}

	/// A member of an organization holding the given role.
	pub fn member(id: UserId, role: Role, organization_id: OrgId) -> Self {
		Self {
			id,
			role,
			organization_id: Some(organization_id),
		}
	}

	pub fn is_super_admin(&self) -> bool {
		self.role == Role::SuperAdmin
	}

	/// Returns true if the actor belongs to the given organization.
	///
	/// Always false for super admins, who have no organization.
	pub fn in_org(&self, org_id: OrgId) -> bool {
		self.organization_id == Some(org_id)
	}
}

/// Persisted account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	pub id: UserId,
	pub organization_id: Option<OrgId>,
	pub email: String,
	pub full_name: String,
	pub role: Role,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Profile {
	pub fn actor(&self) -> Actor {
		Actor {
			id: self.id,
			role: self.role,
			organization_id: self.organization_id,
		}
	}
}
