// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use desk_policy::{NewOrganization, Organization};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateOrgRequest {
	pub name: String,
	pub domain: String,
}

impl From<CreateOrgRequest> for NewOrganization {
	fn from(req: CreateOrgRequest) -> Self {
		NewOrganization {
			name: req.name,
			domain: req.domain,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListOrgsResponse {
	pub organizations: Vec<Organization>,
}
