// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Super admin endpoints: break-glass access and the audit trail.

use axum::{extract::State, http::StatusCode, Json};
use desk_policy::AuditEventType;

pub use desk_server_api::admin::*;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
	extract::{ApiJson, ApiQuery, CurrentActor},
};

const DEFAULT_AUDIT_LIMIT: i64 = 50;

#[utoipa::path(
    post,
    path = "/api/admin/break-glass",
    request_body = BreakGlassRequest,
    responses(
        (status = 201, description = "Access recorded", body = AuditLogEntryResponse),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 403, description = "Not a super admin", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// POST /api/admin/break-glass
#[tracing::instrument(skip_all, fields(user_id = %current.0.id, ticket_id = ?req.ticket_id))]
pub async fn break_glass(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiJson(req): ApiJson<BreakGlassRequest>,
) -> Result<(StatusCode, Json<AuditLogEntryResponse>), ServerError> {
	let entry = state
		.directory
		.break_glass(&current.actor(), &req.reason, req.ticket_id)
		.await?;
	Ok((StatusCode::CREATED, Json(entry.into())))
}

#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    params(ListAuditLogsParams),
    responses(
        (status = 200, description = "Audit entries, newest first", body = ListAuditLogsResponse),
        (status = 400, description = "Unknown event type", body = ErrorResponse),
        (status = 403, description = "Not a super admin", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/audit-logs
#[tracing::instrument(skip_all, fields(user_id = %current.0.id))]
pub async fn list_audit_logs(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiQuery(params): ApiQuery<ListAuditLogsParams>,
) -> Result<Json<ListAuditLogsResponse>, ServerError> {
	let event_type = params
		.event_type
		.as_deref()
		.map(parse_event_type)
		.transpose()?;
	let limit = params.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, 1000);
	let offset = params.offset.unwrap_or(0).max(0);

	let (logs, total) = state
		.directory
		.audit_logs(&current.actor(), event_type, limit, offset)
		.await?;

	Ok(Json(ListAuditLogsResponse {
		logs: logs.into_iter().map(AuditLogEntryResponse::from).collect(),
		total,
		limit,
		offset,
	}))
}

fn parse_event_type(raw: &str) -> Result<AuditEventType, ServerError> {
	serde_json::from_value(serde_json::Value::String(raw.to_string()))
		.map_err(|_| ServerError::BadRequest(format!("unknown event type: {raw}")))
}
