// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test helpers: in-memory pools and seed rows.

use chrono::Utc;
use desk_policy::{OrgId, Organization, Profile, Role, UserId};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::migrate::run_migrations;
use crate::org::OrgRepository;
use crate::profile::ProfileRepository;

/// A single-connection in-memory pool, so every query sees the same database.
pub async fn create_test_pool() -> SqlitePool {
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap()
}

/// An in-memory pool with the full schema applied.
pub async fn create_migrated_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn seed_org(pool: &SqlitePool, domain: &str) -> Organization {
	let now = Utc::now();
	let org = Organization {
		id: OrgId::generate(),
		name: domain.to_string(),
		domain: domain.to_string(),
		created_at: now,
		updated_at: now,
	};
	OrgRepository::new(pool.clone()).create_org(&org).await.unwrap();
	org
}

pub async fn seed_profile(pool: &SqlitePool, org: Option<OrgId>, role: Role, name: &str) -> Profile {
	let now = Utc::now();
	let id = UserId::generate();
	let profile = Profile {
		id,
		organization_id: org,
		email: format!("{}-{}@example.com", name.to_lowercase(), id),
		full_name: name.to_string(),
		role,
		created_at: now,
		updated_at: now,
	};
	ProfileRepository::new(pool.clone())
		.create_profile(&profile)
		.await
		.unwrap();
	profile
}
