// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request extractors: the calling actor, and JSON/query bodies whose
//! rejections use the standard error body.

use axum::{
	extract::{
		rejection::{JsonRejection, QueryRejection},
		FromRequest, FromRequestParts, Query, Request,
	},
	http::request::Parts,
	Json,
};
use desk_policy::{Actor, Profile, TicketId, UserId};
use tracing::instrument;

use crate::api::AppState;
use crate::error::ServerError;

/// The profile named by the identity header.
///
/// The upstream gateway authenticates the caller and forwards their profile
/// id. A missing or malformed header is 401; an id with no profile is 404.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Profile);

impl CurrentActor {
	pub fn actor(&self) -> Actor {
		self.0.actor()
	}
}

impl FromRequestParts<AppState> for CurrentActor {
	type Rejection = ServerError;

	#[instrument(name = "CurrentActor::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let header = state.identity_header.as_str();
		let raw = parts
			.headers
			.get(header)
			.ok_or_else(|| ServerError::Unauthorized(format!("missing {header} header")))?
			.to_str()
			.map_err(|_| ServerError::Unauthorized(format!("malformed {header} header")))?;

		let user_id: UserId = raw
			.trim()
			.parse()
			.map_err(|_| ServerError::Unauthorized(format!("malformed {header} header")))?;

		let profile = state
			.profiles
			.get_profile(&user_id)
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("profile {user_id}")))?;

		tracing::debug!(user_id = %profile.id, role = %profile.role, "actor resolved");
		Ok(CurrentActor(profile))
	}
}

/// `Json<T>` whose rejection is a 400 with an [`crate::error::ErrorResponse`].
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
	Json<T>: FromRequest<S, Rejection = JsonRejection>,
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match Json::<T>::from_request(req, state).await {
			Ok(Json(value)) => Ok(ApiJson(value)),
			Err(rejection) => Err(ServerError::BadRequest(rejection.body_text())),
		}
	}
}

/// `Query<T>` whose rejection is a 400 with an [`crate::error::ErrorResponse`].
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
	Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		match Query::<T>::from_request_parts(parts, state).await {
			Ok(Query(value)) => Ok(ApiQuery(value)),
			Err(rejection) => Err(ServerError::BadRequest(rejection.body_text())),
		}
	}
}

pub fn parse_ticket_id(raw: &str) -> Result<TicketId, ServerError> {
	raw.parse()
		.map_err(|_| ServerError::BadRequest(format!("invalid ticket id: {raw}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn ticket_id_must_be_a_uuid() {
		let id = TicketId::generate();
		assert_eq!(parse_ticket_id(&id.to_string()).unwrap(), id);
		assert!(matches!(
			parse_ticket_id("ticket-42"),
			Err(ServerError::BadRequest(_))
		));
	}

	proptest! {
		#[test]
		fn arbitrary_path_segments_never_panic(raw in "\\PC*") {
			let _ = parse_ticket_id(&raw);
		}
	}
}
