// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use desk_policy::UserId;

use super::support::{expect_status, TestApp};

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
	let app = TestApp::new().await;
	let body = expect_status(app.get("/api/tickets", None).await, StatusCode::UNAUTHORIZED, "no header").await;
	assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn malformed_identity_header_is_unauthorized() {
	let app = TestApp::new().await;
	expect_status(
		app.get_as_raw("/api/tickets", "not-a-uuid").await,
		StatusCode::UNAUTHORIZED,
		"malformed header",
	)
	.await;
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
	let app = TestApp::new().await;
	expect_status(
		app.get_as_raw("/api/tickets", &UserId::generate().to_string()).await,
		StatusCode::NOT_FOUND,
		"unknown profile",
	)
	.await;
}

#[tokio::test]
async fn health_and_openapi_need_no_identity() {
	let app = TestApp::new().await;
	let health = expect_status(app.get("/health", None).await, StatusCode::OK, "health").await;
	assert_eq!(health["status"], "healthy");
	assert_eq!(health["database"]["status"], "healthy");

	let doc = expect_status(app.get("/api/openapi.json", None).await, StatusCode::OK, "openapi").await;
	assert!(doc["paths"]["/api/tickets"].is_object());
}
