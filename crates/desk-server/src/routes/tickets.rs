// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ticket HTTP handlers.
//!
//! Handlers only translate between HTTP and [`crate::service::TicketService`];
//! every decision is made by the policy engine behind it.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use desk_policy::{NewTicket, StatusRequest, Ticket, TicketComment};

pub use desk_server_api::tickets::*;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
	extract::{parse_ticket_id, ApiJson, ApiQuery, CurrentActor},
	service::TicketFilter,
};

#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = Ticket),
        (status = 400, description = "Invalid ticket", body = ErrorResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// POST /api/tickets - Raise a ticket in the caller's organization.
#[tracing::instrument(skip_all, fields(user_id = %current.0.id))]
pub async fn create_ticket(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiJson(req): ApiJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ServerError> {
	let ticket = state
		.tickets
		.create(&current.actor(), &NewTicket::from(req))
		.await?;
	Ok((StatusCode::CREATED, Json(ticket)))
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    params(ListTicketsParams),
    responses(
        (status = 200, description = "Tickets visible to the caller", body = ListTicketsResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// GET /api/tickets - List tickets within the caller's visibility.
#[tracing::instrument(skip_all, fields(user_id = %current.0.id))]
pub async fn list_tickets(
	State(state): State<AppState>,
	current: CurrentActor,
	ApiQuery(params): ApiQuery<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ServerError> {
	let limit = params.limit_clamped(
		state.tickets_config.default_page_size,
		state.tickets_config.max_page_size,
	);
	let filter = TicketFilter {
		status: params.status,
		priority: params.priority,
		category: params.category,
		limit,
		offset: params.offset(limit),
	};

	let (tickets, total) = state.tickets.list(&current.actor(), filter).await?;
	Ok(Json(ListTicketsResponse {
		tickets,
		total,
		page: params.page_or_default(),
		limit,
	}))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "The ticket", body = Ticket),
        (status = 403, description = "Not visible to the caller", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// GET /api/tickets/{id}
#[tracing::instrument(skip(state, current), fields(user_id = %current.0.id))]
pub async fn get_ticket(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
) -> Result<Json<Ticket>, ServerError> {
	let id = parse_ticket_id(&id)?;
	Ok(Json(state.tickets.get(&current.actor(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}/updates",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket history, oldest first", body = ListUpdatesResponse),
        (status = 403, description = "Not visible to the caller", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// GET /api/tickets/{id}/updates
#[tracing::instrument(skip(state, current), fields(user_id = %current.0.id))]
pub async fn list_updates(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
) -> Result<Json<ListUpdatesResponse>, ServerError> {
	let id = parse_ticket_id(&id)?;
	let updates = state.tickets.history(&current.actor(), id).await?;
	Ok(Json(ListUpdatesResponse { updates }))
}

#[utoipa::path(
    patch,
    path = "/api/tickets/{id}/status",
    params(("id" = String, Path, description = "Ticket ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed or note recorded", body = Ticket),
        (status = 400, description = "Invalid transition", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// PATCH /api/tickets/{id}/status
#[tracing::instrument(skip(state, current, req), fields(user_id = %current.0.id, to = %req.status))]
pub async fn update_status(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
	ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Ticket>, ServerError> {
	let id = parse_ticket_id(&id)?;
	let request = StatusRequest::from(req);
	Ok(Json(
		state
			.tickets
			.change_status(&current.actor(), id, &request)
			.await?,
	))
}

#[utoipa::path(
    put,
    path = "/api/tickets/{id}/assign",
    params(("id" = String, Path, description = "Ticket ID")),
    request_body = AssignContractorRequest,
    responses(
        (status = 200, description = "Contractor assigned", body = Ticket),
        (status = 400, description = "Not a contractor or ticket not assignable", body = ErrorResponse),
        (status = 403, description = "Not permitted or cross-organization", body = ErrorResponse),
        (status = 404, description = "No such ticket or contractor", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// PUT /api/tickets/{id}/assign
#[tracing::instrument(skip(state, current, req), fields(user_id = %current.0.id, contractor_id = %req.contractor_id))]
pub async fn assign_contractor(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
	ApiJson(req): ApiJson<AssignContractorRequest>,
) -> Result<Json<Ticket>, ServerError> {
	let id = parse_ticket_id(&id)?;
	Ok(Json(
		state
			.tickets
			.assign(&current.actor(), id, req.contractor_id, &req.schedule())
			.await?,
	))
}

#[utoipa::path(
    delete,
    path = "/api/tickets/{id}/assign",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Contractor removed, ticket reopened", body = Ticket),
        (status = 400, description = "Ticket has no assignment", body = ErrorResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// DELETE /api/tickets/{id}/assign
#[tracing::instrument(skip(state, current), fields(user_id = %current.0.id))]
pub async fn unassign_contractor(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
) -> Result<Json<Ticket>, ServerError> {
	let id = parse_ticket_id(&id)?;
	Ok(Json(state.tickets.unassign(&current.actor(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}/messages",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = ListMessagesResponse),
        (status = 403, description = "Not visible to the caller", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// GET /api/tickets/{id}/messages
#[tracing::instrument(skip(state, current), fields(user_id = %current.0.id))]
pub async fn list_messages(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
) -> Result<Json<ListMessagesResponse>, ServerError> {
	let id = parse_ticket_id(&id)?;
	let messages = state.tickets.comments(&current.actor(), id).await?;
	Ok(Json(ListMessagesResponse { messages }))
}

#[utoipa::path(
    post,
    path = "/api/tickets/{id}/messages",
    params(("id" = String, Path, description = "Ticket ID")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Comment posted", body = TicketComment),
        (status = 400, description = "Empty or oversized message", body = ErrorResponse),
        (status = 403, description = "Not visible to the caller", body = ErrorResponse),
        (status = 404, description = "No such ticket", body = ErrorResponse)
    ),
    tag = "tickets"
)]
/// POST /api/tickets/{id}/messages
#[tracing::instrument(skip(state, current, req), fields(user_id = %current.0.id))]
pub async fn post_message(
	State(state): State<AppState>,
	current: CurrentActor,
	Path(id): Path<String>,
	ApiJson(req): ApiJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<TicketComment>), ServerError> {
	let id = parse_ticket_id(&id)?;
	let comment = state
		.tickets
		.post_comment(&current.actor(), id, &req.message)
		.await?;
	Ok((StatusCode::CREATED, Json(comment)))
}
