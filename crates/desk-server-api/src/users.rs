// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use desk_policy::{NewProfile, OrgId, Profile, Role, UserId};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// A profile in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProfileResponse {
	pub id: UserId,
	pub organization_id: Option<OrgId>,
	pub email: String,
	pub full_name: String,
	pub role: Role,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
	fn from(p: Profile) -> Self {
		Self {
			id: p.id,
			organization_id: p.organization_id,
			email: p.email,
			full_name: p.full_name,
			role: p.role,
			created_at: p.created_at,
			updated_at: p.updated_at,
		}
	}
}

/// Request to create a profile. Org admins may omit `organization_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateProfileRequest {
	pub email: String,
	pub full_name: String,
	pub role: Role,
	#[serde(default)]
	pub organization_id: Option<OrgId>,
}

impl From<CreateProfileRequest> for NewProfile {
	fn from(req: CreateProfileRequest) -> Self {
		NewProfile {
			email: req.email,
			full_name: req.full_name,
			role: req.role,
			organization_id: req.organization_id,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct ListProfilesParams {
	/// Super admins may narrow the listing to one organization.
	pub organization_id: Option<OrgId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListProfilesResponse {
	pub profiles: Vec<ProfileResponse>,
}
