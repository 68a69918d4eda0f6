// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use desk_policy::TicketId;
use serde_json::json;

use super::support::{expect_status, read_json, TestApp};

#[tokio::test]
async fn break_glass_is_super_admin_only_and_audited() {
	let app = TestApp::new().await;
	let root = &app.fixtures.super_admin;
	let ticket = app
		.raise_ticket(&app.fixtures.org_a.user, "Server room door stuck")
		.await;

	let entry = expect_status(
		app.post(
			"/api/admin/break-glass",
			Some(root),
			json!({"reason": "Tenant locked out during outage", "ticket_id": ticket.id}),
		)
		.await,
		StatusCode::CREATED,
		"super admin",
	)
	.await;
	assert_eq!(entry["event_type"], "break_glass");
	assert_eq!(entry["resource_id"], ticket.id.to_string());
	assert_eq!(entry["details"]["reason"], "Tenant locked out during outage");

	expect_status(
		app.post(
			"/api/admin/break-glass",
			Some(&app.fixtures.org_a.admin),
			json!({"reason": "Curious"}),
		)
		.await,
		StatusCode::FORBIDDEN,
		"org admin",
	)
	.await;
	expect_status(
		app.post("/api/admin/break-glass", Some(root), json!({"reason": "  "})).await,
		StatusCode::BAD_REQUEST,
		"blank reason",
	)
	.await;

	let logs: serde_json::Value = read_json(
		app.get("/api/admin/audit-logs?event_type=break_glass", Some(root))
			.await,
	)
	.await;
	assert_eq!(logs["total"], 1);

	let denied: serde_json::Value = read_json(
		app.get("/api/admin/audit-logs?event_type=access_denied", Some(root))
			.await,
	)
	.await;
	assert_eq!(denied["total"], 1);
	assert_eq!(denied["logs"][0]["action"], "break_glass");
	assert_eq!(denied["logs"][0]["actor_user_id"], app.fixtures.org_a.admin.id.to_string());
}

#[tokio::test]
async fn cross_org_denials_are_recorded() {
	let app = TestApp::new().await;
	let ticket = app
		.raise_ticket(&app.fixtures.org_a.user, "Fire exit sign flickering")
		.await;

	expect_status(
		app.get(&format!("/api/tickets/{}", ticket.id), Some(&app.fixtures.org_b.admin))
			.await,
		StatusCode::FORBIDDEN,
		"cross-org view",
	)
	.await;

	let logs: serde_json::Value = read_json(
		app.get(
			"/api/admin/audit-logs?event_type=access_denied",
			Some(&app.fixtures.super_admin),
		)
		.await,
	)
	.await;
	assert_eq!(logs["total"], 1);
	assert_eq!(logs["logs"][0]["action"], "view_ticket");
	assert_eq!(logs["logs"][0]["resource_id"], ticket.id.to_string());
}

#[tokio::test]
async fn audit_log_access_and_filters() {
	let app = TestApp::new().await;

	expect_status(
		app.get("/api/admin/audit-logs", Some(&app.fixtures.org_a.admin)).await,
		StatusCode::FORBIDDEN,
		"org admin reads audit",
	)
	.await;
	expect_status(
		app.get(
			"/api/admin/audit-logs?event_type=nonsense",
			Some(&app.fixtures.super_admin),
		)
		.await,
		StatusCode::BAD_REQUEST,
		"unknown event type",
	)
	.await;
}

#[tokio::test]
async fn break_glass_refusal_does_not_reveal_unknown_tickets() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.org_a.admin;

	let unknown = expect_status(
		app.post(
			"/api/admin/break-glass",
			Some(admin),
			json!({"reason": "Checking a hunch", "ticket_id": TicketId::generate()}),
		)
		.await,
		StatusCode::FORBIDDEN,
		"org admin with unknown ticket",
	)
	.await;
	assert_eq!(unknown["error"], "forbidden");

	expect_status(
		app.post(
			"/api/admin/break-glass",
			Some(&app.fixtures.super_admin),
			json!({"reason": "Checking a hunch", "ticket_id": TicketId::generate()}),
		)
		.await,
		StatusCode::NOT_FOUND,
		"super admin with unknown ticket",
	)
	.await;
}
