// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	routing::{get, patch, post, put},
	Router,
};
use desk_server_config::{ServerConfig, TicketsConfig};
use desk_server_db::{
	AuditRepository, CommentRepository, NotificationRepository, OrgRepository, ProfileRepository,
	ProfileStore, TicketRepository, TicketStore,
};
use sqlx::sqlite::SqlitePool;

use crate::{audit::AuditRecorder, directory::DirectoryService, routes, service::TicketService};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
	pub profiles: Arc<dyn ProfileStore>,
	pub ticket_store: Arc<dyn TicketStore>,
	pub tickets: Arc<TicketService>,
	pub directory: Arc<DirectoryService>,
	/// Lower-cased name of the header carrying the caller's profile id.
	pub identity_header: String,
	pub tickets_config: TicketsConfig,
}

/// Wires the SQLite repositories into the services.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let profiles: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(pool.clone()));
	let ticket_store: Arc<dyn TicketStore> = Arc::new(TicketRepository::new(pool.clone()));
	let audit = AuditRecorder::new(Arc::new(AuditRepository::new(pool.clone())));

	let mut tickets = TicketService::new(
		Arc::clone(&ticket_store),
		Arc::new(CommentRepository::new(pool.clone())),
		Arc::clone(&profiles),
		audit.clone(),
	)
	.with_retry_attempts(config.tickets.conflict_retry_attempts);
	if config.tickets.notifications_enabled {
		tickets = tickets.with_notifier(Arc::new(NotificationRepository::new(pool.clone())));
	} else {
		tracing::info!("ticket notifications disabled");
	}

	let directory = DirectoryService::new(
		Arc::clone(&profiles),
		Arc::new(OrgRepository::new(pool)),
		Arc::clone(&ticket_store),
		audit,
	);

	AppState {
		profiles,
		ticket_store,
		tickets: Arc::new(tickets),
		directory: Arc::new(directory),
		identity_header: config.auth.identity_header.clone(),
		tickets_config: config.tickets.clone(),
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(routes::docs::openapi_json))
		.route(
			"/api/tickets",
			get(routes::tickets::list_tickets).post(routes::tickets::create_ticket),
		)
		.route("/api/tickets/{id}", get(routes::tickets::get_ticket))
		.route("/api/tickets/{id}/updates", get(routes::tickets::list_updates))
		.route("/api/tickets/{id}/status", patch(routes::tickets::update_status))
		.route(
			"/api/tickets/{id}/assign",
			put(routes::tickets::assign_contractor).delete(routes::tickets::unassign_contractor),
		)
		.route(
			"/api/tickets/{id}/messages",
			get(routes::tickets::list_messages).post(routes::tickets::post_message),
		)
		.route(
			"/api/users",
			get(routes::users::list_users).post(routes::users::create_user),
		)
		.route(
			"/api/orgs",
			get(routes::orgs::list_orgs).post(routes::orgs::create_org),
		)
		.route("/api/admin/break-glass", post(routes::admin::break_glass))
		.route("/api/admin/audit-logs", get(routes::admin::list_audit_logs))
		.with_state(state)
}
