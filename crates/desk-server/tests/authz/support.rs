// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{Method, Request, StatusCode},
	response::Response,
	Router,
};
use desk_policy::{Organization, Profile, Role, Ticket};
use desk_server::{create_app_state, create_router, AppState, ServerConfig};
use desk_server_db::testing::{seed_org, seed_profile};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const IDENTITY_HEADER: &str = "x-desk-user-id";

pub struct OrgFixture {
	pub org: Organization,
	pub admin: Profile,
	pub contractor: Profile,
	pub user: Profile,
}

pub struct Fixtures {
	pub org_a: OrgFixture,
	pub org_b: OrgFixture,
	pub super_admin: Profile,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	pub pool: SqlitePool,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = desk_server_db::create_pool(&db_url, 5).await.unwrap();
		desk_server_db::run_migrations(&pool).await.unwrap();

		let config = ServerConfig::default();
		let state = create_app_state(pool.clone(), &config);

		let fixtures = Fixtures {
			org_a: create_org_fixture(&pool, "org-a.example").await,
			org_b: create_org_fixture(&pool, "org-b.example").await,
			super_admin: seed_profile(&pool, None, Role::SuperAdmin, "Root").await,
		};

		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			pool,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&Profile>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(&self, path: &str, user: Option<&Profile>, body: impl Serialize) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(&self, path: &str, user: Option<&Profile>, body: impl Serialize) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn patch(&self, path: &str, user: Option<&Profile>, body: impl Serialize) -> Response<Body> {
		self.request(Method::PATCH, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&Profile>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	/// GET with a raw identity header value.
	pub async fn get_as_raw(&self, path: &str, header_value: &str) -> Response<Body> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(path)
			.header(IDENTITY_HEADER, header_value)
			.body(Body::empty())
			.unwrap();
		self.router.clone().oneshot(request).await.unwrap()
	}

	/// Raises a ticket as `requester` through the API.
	pub async fn raise_ticket(&self, requester: &Profile, title: &str) -> Ticket {
		let response = self
			.post(
				"/api/tickets",
				Some(requester),
				json!({
					"title": title,
					"description": "Something on site needs attention soon",
					"priority": "high",
					"category": "maintenance",
				}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::CREATED);
		read_json(response).await
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&Profile>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(profile) = user {
			builder = builder.header(IDENTITY_HEADER, profile.id.to_string());
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

/// Asserts the status, printing the body on mismatch.
pub async fn expect_status(response: Response<Body>, expected: StatusCode, case: &str) -> serde_json::Value {
	let (parts, body) = response.into_parts();
	let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
	let body_str = String::from_utf8_lossy(&bytes);
	assert_eq!(
		parts.status, expected,
		"Case '{case}': expected {expected}, got {}\nResponse body: {body_str}",
		parts.status
	);
	if bytes.is_empty() {
		serde_json::Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
	}
}

async fn create_org_fixture(pool: &SqlitePool, domain: &str) -> OrgFixture {
	let org = seed_org(pool, domain).await;
	let admin = seed_profile(pool, Some(org.id), Role::OrgAdmin, "Admin").await;
	let contractor = seed_profile(pool, Some(org.id), Role::Contractor, "Casey").await;
	let user = seed_profile(pool, Some(org.id), Role::User, "Robin").await;
	OrgFixture {
		org,
		admin,
		contractor,
		user,
	}
}
