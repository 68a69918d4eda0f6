// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile management HTTP handlers.

use axum::{extract::State, http::StatusCode, Json};
use desk_policy::NewProfile;

pub use desk_server_api::users::*;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
	extract::{ApiJson, ApiQuery, CurrentActor},
};

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListProfilesParams),
    responses(
        (status = 200, description = "Profiles the caller manages", body = ListProfilesResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse)
    ),
    tag = "users"
)]
/// GET /api/users
#[tracing::instrument(skip_all, fields(user_id = %current.0.id))]
pub async fn list_users(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiQuery(params): ApiQuery<ListProfilesParams>,
) -> Result<Json<ListProfilesResponse>, ServerError> {
	let profiles = state
		.directory
		.list_profiles(&current.actor(), params.organization_id)
		.await?;
	Ok(Json(ListProfilesResponse {
		profiles: profiles.into_iter().map(ProfileResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid profile", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "users"
)]
/// POST /api/users
#[tracing::instrument(skip_all, fields(user_id = %current.0.id, role = %req.role))]
pub async fn create_user(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiJson(req): ApiJson<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ServerError> {
	let profile = state
		.directory
		.create_profile(&current.actor(), &NewProfile::from(req))
		.await?;
	Ok((StatusCode::CREATED, Json(profile.into())))
}
