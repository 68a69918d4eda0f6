// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use desk_policy::{Ticket, TicketStatus, UserId};
use serde_json::json;

use super::support::{expect_status, read_json, TestApp};

#[tokio::test]
async fn full_lifecycle_to_closed() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let ticket = app.raise_ticket(&a.user, "Replace hallway light").await;
	let status_path = format!("/api/tickets/{}/status", ticket.id);

	let assigned: Ticket = read_json(
		app.put(
			&format!("/api/tickets/{}/assign", ticket.id),
			Some(&a.admin),
			json!({"contractor_id": a.contractor.id, "estimated_duration": 90}),
		)
		.await,
	)
	.await;
	assert_eq!(assigned.status, TicketStatus::Assigned);
	assert_eq!(assigned.contractor_id, Some(a.contractor.id));
	assert_eq!(assigned.admin_id, Some(a.admin.id));
	assert_eq!(assigned.estimated_duration, Some(90));
	assert_eq!(assigned.version, 2);

	for (status, version) in [("accepted", 3), ("in_progress", 4), ("completed", 5)] {
		let moved: Ticket = read_json(
			app.patch(&status_path, Some(&a.contractor), json!({"status": status}))
				.await,
		)
		.await;
		assert_eq!(moved.status.as_str(), status);
		assert_eq!(moved.version, version);
	}

	let closed: Ticket = read_json(
		app.patch(&status_path, Some(&a.admin), json!({"status": "closed", "note": "Verified"}))
			.await,
	)
	.await;
	assert_eq!(closed.status, TicketStatus::Closed);

	let history: serde_json::Value = read_json(
		app.get(&format!("/api/tickets/{}/updates", ticket.id), Some(&a.user))
			.await,
	)
	.await;
	let types: Vec<_> = history["updates"]
		.as_array()
		.unwrap()
		.iter()
		.map(|u| u["update_type"].as_str().unwrap().to_string())
		.collect();
	assert_eq!(
		types,
		["created", "assigned", "accepted", "in_progress", "completed", "closed"]
	);
}

#[tokio::test]
async fn status_rules_map_to_http_errors() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let ticket = app.raise_ticket(&a.user, "Fix the loading dock").await;
	let path = format!("/api/tickets/{}/status", ticket.id);

	let body = expect_status(
		app.patch(&path, Some(&a.admin), json!({"status": "completed"})).await,
		StatusCode::BAD_REQUEST,
		"no edge open->completed",
	)
	.await;
	assert_eq!(body["error"], "invalid_transition");

	expect_status(
		app.patch(&path, Some(&a.admin), json!({"status": "assigned"})).await,
		StatusCode::FORBIDDEN,
		"assigned only via assignment",
	)
	.await;
	expect_status(
		app.patch(&path, Some(&a.user), json!({"status": "cancelled"})).await,
		StatusCode::FORBIDDEN,
		"users hold no update_status",
	)
	.await;
	expect_status(
		app.patch(&path, Some(&app.fixtures.org_b.admin), json!({"status": "cancelled"})).await,
		StatusCode::FORBIDDEN,
		"other org admin",
	)
	.await;
	expect_status(
		app.patch(&path, Some(&a.admin), json!({"status": "open"})).await,
		StatusCode::BAD_REQUEST,
		"same status without note",
	)
	.await;

	let noted: Ticket = read_json(
		app.patch(&path, Some(&a.admin), json!({"status": "open", "note": "Parts ordered"}))
			.await,
	)
	.await;
	assert_eq!(noted.status, TicketStatus::Open);

	let cancelled: Ticket = read_json(
		app.patch(&path, Some(&a.admin), json!({"status": "cancelled"})).await,
	)
	.await;
	assert_eq!(cancelled.status, TicketStatus::Cancelled);
}

#[tokio::test]
async fn assignment_rules_map_to_http_errors() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let b = &app.fixtures.org_b;
	let ticket = app.raise_ticket(&a.user, "Roof gutter blocked").await;
	let path = format!("/api/tickets/{}/assign", ticket.id);

	let body = expect_status(
		app.put(&path, Some(&a.admin), json!({"contractor_id": b.contractor.id})).await,
		StatusCode::FORBIDDEN,
		"org admin cross-org",
	)
	.await;
	assert_eq!(body["error"], "cross_org_assignment_denied");

	let body = expect_status(
		app.put(&path, Some(&a.admin), json!({"contractor_id": a.user.id})).await,
		StatusCode::BAD_REQUEST,
		"not a contractor",
	)
	.await;
	assert_eq!(body["error"], "not_a_contractor");

	expect_status(
		app.put(&path, Some(&a.contractor), json!({"contractor_id": a.contractor.id})).await,
		StatusCode::FORBIDDEN,
		"contractor cannot self-assign",
	)
	.await;

	let assigned: Ticket = read_json(
		app.put(&path, Some(&app.fixtures.super_admin), json!({"contractor_id": b.contractor.id}))
			.await,
	)
	.await;
	assert_eq!(assigned.contractor_id, Some(b.contractor.id));

	// Cross-org contractor sees the ticket once assigned.
	expect_status(
		app.get(&format!("/api/tickets/{}", ticket.id), Some(&b.contractor)).await,
		StatusCode::OK,
		"assigned contractor views",
	)
	.await;

	let unassigned: Ticket = read_json(app.delete(&path, Some(&a.admin)).await).await;
	assert_eq!(unassigned.status, TicketStatus::Open);
	assert_eq!(unassigned.contractor_id, None);
	assert_eq!(unassigned.admin_id, None);

	expect_status(
		app.get(&format!("/api/tickets/{}", ticket.id), Some(&b.contractor)).await,
		StatusCode::FORBIDDEN,
		"removed contractor loses access",
	)
	.await;

	expect_status(
		app.delete(&path, Some(&a.admin)).await,
		StatusCode::BAD_REQUEST,
		"nothing to unassign",
	)
	.await;
}

#[tokio::test]
async fn assignment_queues_contractor_notification() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let ticket = app.raise_ticket(&a.user, "Door closer broken").await;

	expect_status(
		app.put(
			&format!("/api/tickets/{}/assign", ticket.id),
			Some(&a.admin),
			json!({"contractor_id": a.contractor.id}),
		)
		.await,
		StatusCode::OK,
		"assign",
	)
	.await;

	let pending = desk_server_db::NotificationRepository::new(app.pool.clone())
		.list_pending(&a.contractor.id)
		.await
		.unwrap();
	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].ticket_id, ticket.id);
}

#[tokio::test]
async fn unprivileged_assign_does_not_reveal_unknown_users() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let ticket = app.raise_ticket(&a.user, "Loading dock light out").await;
	let path = format!("/api/tickets/{}/assign", ticket.id);

	let unknown = expect_status(
		app.put(&path, Some(&a.user), json!({"contractor_id": UserId::generate()})).await,
		StatusCode::FORBIDDEN,
		"user assigns unknown id",
	)
	.await;
	let known = expect_status(
		app.put(&path, Some(&a.user), json!({"contractor_id": a.contractor.id})).await,
		StatusCode::FORBIDDEN,
		"user assigns real contractor",
	)
	.await;
	assert_eq!(unknown["error"], known["error"]);
}
