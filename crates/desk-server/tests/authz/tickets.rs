// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use desk_policy::{TicketId, TicketStatus};
use serde_json::json;

use super::support::{expect_status, read_json, TestApp};

#[tokio::test]
async fn requester_creates_open_ticket_at_version_one() {
	let app = TestApp::new().await;
	let requester = &app.fixtures.org_a.user;

	let ticket = app.raise_ticket(requester, "Leaking kitchen tap").await;
	assert_eq!(ticket.status, TicketStatus::Open);
	assert_eq!(ticket.requester_id, requester.id);
	assert_eq!(ticket.organization_id, app.fixtures.org_a.org.id);
	assert_eq!(ticket.version, 1);
}

#[tokio::test]
async fn super_admin_cannot_raise_tickets() {
	let app = TestApp::new().await;
	let response = app
		.post(
			"/api/tickets",
			Some(&app.fixtures.super_admin),
			json!({"title": "Root ticket", "description": "Super admins have no organization"}),
		)
		.await;
	let body = expect_status(response, StatusCode::FORBIDDEN, "super admin create").await;
	assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn invalid_ticket_body_is_bad_request() {
	let app = TestApp::new().await;
	let user = &app.fixtures.org_a.user;

	let short = app
		.post("/api/tickets", Some(user), json!({"title": "Hey", "description": "Long enough description"}))
		.await;
	let body = expect_status(short, StatusCode::BAD_REQUEST, "short title").await;
	assert_eq!(body["error"], "validation_error");

	let malformed = app.post("/api/tickets", Some(user), json!({"title": 42})).await;
	let body = expect_status(malformed, StatusCode::BAD_REQUEST, "malformed json").await;
	assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn ticket_visibility_follows_role_and_org() {
	let app = TestApp::new().await;
	let ticket = app.raise_ticket(&app.fixtures.org_a.user, "Broken window latch").await;
	let path = format!("/api/tickets/{}", ticket.id);

	let cases = [
		("requester", &app.fixtures.org_a.user, StatusCode::OK),
		("own org admin", &app.fixtures.org_a.admin, StatusCode::OK),
		("own org contractor on open ticket", &app.fixtures.org_a.contractor, StatusCode::OK),
		("super admin", &app.fixtures.super_admin, StatusCode::OK),
		("other org admin", &app.fixtures.org_b.admin, StatusCode::FORBIDDEN),
		("other org contractor", &app.fixtures.org_b.contractor, StatusCode::FORBIDDEN),
		("other org user", &app.fixtures.org_b.user, StatusCode::FORBIDDEN),
	];
	for (name, profile, expected) in cases {
		expect_status(app.get(&path, Some(profile)).await, expected, name).await;
	}
}

#[tokio::test]
async fn unknown_and_malformed_ticket_ids() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.org_a.admin;

	let missing = format!("/api/tickets/{}", TicketId::generate());
	let body = expect_status(app.get(&missing, Some(admin)).await, StatusCode::NOT_FOUND, "unknown").await;
	assert_eq!(body["error"], "not_found");

	expect_status(
		app.get("/api/tickets/not-a-ticket", Some(admin)).await,
		StatusCode::BAD_REQUEST,
		"malformed id",
	)
	.await;
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	app.raise_ticket(&a.user, "First ticket in org a").await;
	app.raise_ticket(&a.user, "Second ticket in org a").await;
	app.raise_ticket(&a.admin, "Admin ticket in org a").await;
	app.raise_ticket(&app.fixtures.org_b.user, "Ticket in org b").await;

	let as_user: serde_json::Value =
		read_json(app.get("/api/tickets", Some(&a.user)).await).await;
	assert_eq!(as_user["total"], 2);

	let as_admin: serde_json::Value =
		read_json(app.get("/api/tickets", Some(&a.admin)).await).await;
	assert_eq!(as_admin["total"], 3);

	let as_root: serde_json::Value =
		read_json(app.get("/api/tickets", Some(&app.fixtures.super_admin)).await).await;
	assert_eq!(as_root["total"], 4);

	let paged: serde_json::Value =
		read_json(app.get("/api/tickets?limit=2&page=2", Some(&a.admin)).await).await;
	assert_eq!(paged["tickets"].as_array().unwrap().len(), 1);
	assert_eq!(paged["page"], 2);
	assert_eq!(paged["limit"], 2);

	let filtered: serde_json::Value =
		read_json(app.get("/api/tickets?status=closed", Some(&a.admin)).await).await;
	assert_eq!(filtered["total"], 0);

	expect_status(
		app.get("/api/tickets?status=bogus", Some(&a.admin)).await,
		StatusCode::BAD_REQUEST,
		"bad filter",
	)
	.await;
}

#[tokio::test]
async fn messages_follow_view_access() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let ticket = app.raise_ticket(&a.user, "Heating is off").await;
	let path = format!("/api/tickets/{}/messages", ticket.id);

	expect_status(
		app.post(&path, Some(&a.user), json!({"message": "Any news?"})).await,
		StatusCode::CREATED,
		"requester posts",
	)
	.await;
	expect_status(
		app.post(&path, Some(&a.admin), json!({"message": "Looking into it"})).await,
		StatusCode::CREATED,
		"admin posts",
	)
	.await;
	expect_status(
		app.post(&path, Some(&app.fixtures.org_b.admin), json!({"message": "Hi"})).await,
		StatusCode::FORBIDDEN,
		"other org posts",
	)
	.await;
	expect_status(
		app.post(&path, Some(&a.user), json!({"message": "   "})).await,
		StatusCode::BAD_REQUEST,
		"blank message",
	)
	.await;

	let listed: serde_json::Value = read_json(app.get(&path, Some(&a.user)).await).await;
	let messages = listed["messages"].as_array().unwrap();
	assert_eq!(messages.len(), 2);
	assert_eq!(messages[0]["body"], "Any news?");
}
