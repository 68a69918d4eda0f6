// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization HTTP handlers. Super admin only.

use axum::{extract::State, http::StatusCode, Json};
use desk_policy::{NewOrganization, Organization};

pub use desk_server_api::orgs::*;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
	extract::{ApiJson, CurrentActor},
};

#[utoipa::path(
    get,
    path = "/api/orgs",
    responses(
        (status = 200, description = "All organizations", body = ListOrgsResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse)
    ),
    tag = "orgs"
)]
/// GET /api/orgs
#[tracing::instrument(skip_all, fields(user_id = %current.0.id))]
pub async fn list_orgs(
	State(state): State<AppState>,
	current: CurrentActor,
) -> Result<Json<ListOrgsResponse>, ServerError> {
	let organizations = state.directory.list_organizations(&current.actor()).await?;
	Ok(Json(ListOrgsResponse { organizations }))
}

#[utoipa::path(
    post,
    path = "/api/orgs",
    request_body = CreateOrgRequest,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Invalid organization", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 409, description = "Domain already taken", body = ErrorResponse)
    ),
    tag = "orgs"
)]
/// POST /api/orgs
#[tracing::instrument(skip_all, fields(user_id = %current.0.id))]
pub async fn create_org(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiJson(req): ApiJson<CreateOrgRequest>,
) -> Result<(StatusCode, Json<Organization>), ServerError> {
	let org = state
		.directory
		.create_organization(&current.actor(), &NewOrganization::from(req))
		.await?;
	Ok((StatusCode::CREATED, Json(org)))
}
