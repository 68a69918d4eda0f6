// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use desk_policy::PolicyError;
use desk_server_db::DbError;

pub use desk_server_api::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// The policy engine refused the request.
	#[error(transparent)]
	Policy(#[from] PolicyError),

	#[error("Database error: {0}")]
	Db(#[from] DbError),

	/// No usable identity on the request.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	#[error("Not found: {0}")]
	NotFound(String),

	/// Malformed input that never reached the policy engine.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// Version conflicts persisted through every retry.
	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl ServerError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ServerError::Policy(e) => policy_status(e),
			ServerError::Db(DbError::NotFound(_)) => StatusCode::NOT_FOUND,
			ServerError::Db(DbError::Conflict(_)) => StatusCode::CONFLICT,
			ServerError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
			ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			ServerError::NotFound(_) => StatusCode::NOT_FOUND,
			ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServerError::Conflict(_) => StatusCode::CONFLICT,
			ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn body(&self) -> ErrorResponse {
		match self {
			ServerError::Policy(e) => ErrorResponse::new(e.code(), e.to_string()),
			ServerError::Db(DbError::NotFound(what)) => {
				ErrorResponse::new("not_found", format!("Not found: {what}"))
			}
			ServerError::Db(DbError::Conflict(msg)) => ErrorResponse::new("conflict", msg.clone()),
			ServerError::Db(_) => {
				ErrorResponse::new("database_error", "A database error occurred")
			}
			ServerError::Unauthorized(msg) => ErrorResponse::new("unauthorized", msg.clone()),
			ServerError::NotFound(what) => {
				ErrorResponse::new("not_found", format!("Not found: {what}"))
			}
			ServerError::BadRequest(msg) => ErrorResponse::new("bad_request", msg.clone()),
			ServerError::Conflict(msg) => ErrorResponse::new("conflict", msg.clone()),
			ServerError::Internal(_) => {
				ErrorResponse::new("internal_error", "An internal error occurred")
			}
		}
	}
}

fn policy_status(err: &PolicyError) -> StatusCode {
	match err {
		PolicyError::Denied(_) | PolicyError::CrossOrgAssignmentDenied => StatusCode::FORBIDDEN,
		PolicyError::InvalidTransition { .. }
		| PolicyError::NotAContractor
		| PolicyError::TicketNotAssignable(_)
		| PolicyError::NotAssigned(_)
		| PolicyError::Validation(_) => StatusCode::BAD_REQUEST,
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		match &self {
			ServerError::Db(e) if status.is_server_error() => {
				tracing::error!(error = %e, "database error");
			}
			ServerError::Internal(msg) => tracing::error!(error = %msg, "internal error"),
			ServerError::Unauthorized(msg) => tracing::warn!(error = %msg, "unauthorized"),
			_ => tracing::debug!(error = %self, status = status.as_u16(), "request failed"),
		}
		(status, Json(self.body())).into_response()
	}
}
