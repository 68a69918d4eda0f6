// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for desk-server, served at `/api/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Desk Server API",
        version = "1.0.0",
        description = "Multi-tenant help-desk ticketing. Callers are identified by a profile id header set by the authenticating gateway.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "tickets", description = "Ticket lifecycle, assignment and comments"),
        (name = "users", description = "Profile management"),
        (name = "orgs", description = "Organization management"),
        (name = "admin", description = "Break-glass access and audit trail (super_admin only)"),
        (name = "health", description = "Health checks")
    ),
    paths(
        crate::routes::tickets::create_ticket,
        crate::routes::tickets::list_tickets,
        crate::routes::tickets::get_ticket,
        crate::routes::tickets::list_updates,
        crate::routes::tickets::update_status,
        crate::routes::tickets::assign_contractor,
        crate::routes::tickets::unassign_contractor,
        crate::routes::tickets::list_messages,
        crate::routes::tickets::post_message,
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::orgs::list_orgs,
        crate::routes::orgs::create_org,
        crate::routes::admin::break_glass,
        crate::routes::admin::list_audit_logs,
        crate::routes::health::health_check,
    ),
    components(schemas(
        desk_policy::Ticket,
        desk_policy::TicketUpdate,
        desk_policy::TicketComment,
        desk_policy::TicketStatus,
        desk_policy::TicketPriority,
        desk_policy::TicketCategory,
        desk_policy::UpdateType,
        desk_policy::Role,
        desk_policy::Organization,
        desk_server_api::ErrorResponse,
        crate::health::HealthResponse,
    ))
)]
pub struct ApiDoc;
