// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions shared by every part of the policy engine.
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for each entity type
//!   ([`UserId`], [`OrgId`], [`TicketId`], etc.) preventing accidental mixing
//! - **Roles**: The four account roles ([`Role`]) that drive every capability decision
//!
//! All ID types implement transparent serde serialization (as UUID strings) and
//! provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ParseError;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Uuid::parse_str(s).map(Self)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user profile.");
define_id_type!(OrgId, "Unique identifier for an organization.");
define_id_type!(TicketId, "Unique identifier for a ticket.");
define_id_type!(TicketUpdateId, "Unique identifier for a ticket update record.");
define_id_type!(CommentId, "Unique identifier for a ticket comment.");
define_id_type!(AuditId, "Unique identifier for an audit log entry.");

// =============================================================================
// Roles
// =============================================================================

/// Account roles. Every profile holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Platform operator. Belongs to no organization.
	SuperAdmin,
	/// Administers a single organization.
	#[serde(alias = "admin")]
	OrgAdmin,
	/// Performs assigned work.
	Contractor,
	/// Raises tickets.
	User,
}

impl Role {
	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[Role::SuperAdmin, Role::OrgAdmin, Role::Contractor, Role::User]
	}

	/// Returns true for roles that administer tickets (super admin and org admin).
	pub fn is_admin(&self) -> bool {
		matches!(self, Role::SuperAdmin | Role::OrgAdmin)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::SuperAdmin => "super_admin",
			Role::OrgAdmin => "org_admin",
			Role::Contractor => "contractor",
			Role::User => "user",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"super_admin" => Ok(Role::SuperAdmin),
			"org_admin" | "admin" => Ok(Role::OrgAdmin),
			"contractor" => Ok(Role::Contractor),
			"user" => Ok(Role::User),
			other => Err(ParseError::unknown("role", other)),
		}
	}
}
