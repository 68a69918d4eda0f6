// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use desk_policy::OrgId;
use serde_json::json;

use super::support::{expect_status, read_json, TestApp};

#[tokio::test]
async fn org_admin_manages_profiles_in_own_org_only() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let b = &app.fixtures.org_b;

	let created = expect_status(
		app.post(
			"/api/users",
			Some(&a.admin),
			json!({"email": "New.Hire@Example.com", "full_name": "New Hire", "role": "contractor"}),
		)
		.await,
		StatusCode::CREATED,
		"own org, org implied",
	)
	.await;
	assert_eq!(created["email"], "new.hire@example.com");
	assert_eq!(created["organization_id"], a.org.id.to_string());

	let cases = [
		(
			"other org",
			json!({"email": "x@example.com", "full_name": "X", "role": "user", "organization_id": b.org.id}),
			StatusCode::FORBIDDEN,
		),
		(
			"mint super admin",
			json!({"email": "root2@example.com", "full_name": "Root Two", "role": "super_admin"}),
			StatusCode::FORBIDDEN,
		),
		(
			"bad email",
			json!({"email": "nope", "full_name": "Nope", "role": "user"}),
			StatusCode::BAD_REQUEST,
		),
	];
	for (name, body, expected) in cases {
		expect_status(app.post("/api/users", Some(&a.admin), body).await, expected, name).await;
	}

	expect_status(
		app.post(
			"/api/users",
			Some(&a.user),
			json!({"email": "y@example.com", "full_name": "Y", "role": "user"}),
		)
		.await,
		StatusCode::FORBIDDEN,
		"plain user",
	)
	.await;
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;
	let body = json!({"email": "dup@example.com", "full_name": "Dup", "role": "user"});

	expect_status(app.post("/api/users", Some(&a.admin), body.clone()).await, StatusCode::CREATED, "first").await;
	let err = expect_status(app.post("/api/users", Some(&a.admin), body).await, StatusCode::CONFLICT, "second").await;
	assert_eq!(err["error"], "conflict");
}

#[tokio::test]
async fn super_admin_needs_an_existing_org_for_members() {
	let app = TestApp::new().await;
	let root = &app.fixtures.super_admin;

	expect_status(
		app.post(
			"/api/users",
			Some(root),
			json!({"email": "ghost@example.com", "full_name": "Ghost", "role": "user", "organization_id": OrgId::generate()}),
		)
		.await,
		StatusCode::NOT_FOUND,
		"unknown org",
	)
	.await;

	expect_status(
		app.post(
			"/api/users",
			Some(root),
			json!({"email": "orphan@example.com", "full_name": "Orphan", "role": "user"}),
		)
		.await,
		StatusCode::BAD_REQUEST,
		"member without org",
	)
	.await;
}

#[tokio::test]
async fn profile_listing_is_org_scoped() {
	let app = TestApp::new().await;
	let a = &app.fixtures.org_a;

	let own: serde_json::Value = read_json(app.get("/api/users", Some(&a.admin)).await).await;
	assert_eq!(own["profiles"].as_array().unwrap().len(), 3);

	expect_status(
		app.get(&format!("/api/users?organization_id={}", app.fixtures.org_b.org.id), Some(&a.admin))
			.await,
		StatusCode::FORBIDDEN,
		"other org listing",
	)
	.await;

	let all: serde_json::Value =
		read_json(app.get("/api/users", Some(&app.fixtures.super_admin)).await).await;
	assert_eq!(all["profiles"].as_array().unwrap().len(), 7);

	expect_status(app.get("/api/users", Some(&a.contractor)).await, StatusCode::FORBIDDEN, "contractor").await;
}

#[tokio::test]
async fn only_super_admin_manages_organizations() {
	let app = TestApp::new().await;
	let root = &app.fixtures.super_admin;

	let org = expect_status(
		app.post("/api/orgs", Some(root), json!({"name": "Gamma Stores", "domain": "Gamma.Example"}))
			.await,
		StatusCode::CREATED,
		"create org",
	)
	.await;
	assert_eq!(org["domain"], "gamma.example");

	let listed: serde_json::Value = read_json(app.get("/api/orgs", Some(root)).await).await;
	assert_eq!(listed["organizations"].as_array().unwrap().len(), 3);

	expect_status(
		app.post(
			"/api/orgs",
			Some(&app.fixtures.org_a.admin),
			json!({"name": "Nope", "domain": "nope.example"}),
		)
		.await,
		StatusCode::FORBIDDEN,
		"org admin creates org",
	)
	.await;
	expect_status(
		app.get("/api/orgs", Some(&app.fixtures.org_a.admin)).await,
		StatusCode::FORBIDDEN,
		"org admin lists orgs",
	)
	.await;
}
