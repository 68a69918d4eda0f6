// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile repository. Resolves request identities to actors.

use async_trait::async_trait;
use desk_policy::{OrgId, Profile, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::convert::{parse, parse_opt, parse_time};
use crate::error::{unique_violation, DbError};

#[async_trait]
pub trait ProfileStore: Send + Sync {
	async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, DbError>;
	async fn create_profile(&self, profile: &Profile) -> Result<(), DbError>;
	/// All profiles, or only those of one organization.
	async fn list_profiles(&self, organization_id: Option<OrgId>) -> Result<Vec<Profile>, DbError>;
}

#[derive(Clone)]
pub struct ProfileRepository {
	pool: SqlitePool,
}

impl ProfileRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, organization_id, email, full_name, role, created_at, updated_at
			FROM profiles
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_profile(&r)).transpose()
	}

	/// # Errors
	/// Returns `DbError::Conflict` if the email is already registered.
	#[tracing::instrument(skip(self, profile), fields(user_id = %profile.id, role = %profile.role))]
	pub async fn create_profile(&self, profile: &Profile) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO profiles (id, organization_id, email, full_name, role, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(profile.id.to_string())
		.bind(profile.organization_id.map(|o| o.to_string()))
		.bind(&profile.email)
		.bind(&profile.full_name)
		.bind(profile.role.as_str())
		.bind(profile.created_at.to_rfc3339())
		.bind(profile.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| unique_violation(e, "profile email"))?;

		tracing::debug!(user_id = %profile.id, "profile created");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_profiles(&self, organization_id: Option<OrgId>) -> Result<Vec<Profile>, DbError> {
		let rows = match organization_id {
			Some(org) => {
				sqlx::query(
					r#"
					SELECT id, organization_id, email, full_name, role, created_at, updated_at
					FROM profiles
					WHERE organization_id = ?
					ORDER BY full_name
					"#,
				)
				.bind(org.to_string())
				.fetch_all(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					r#"
					SELECT id, organization_id, email, full_name, role, created_at, updated_at
					FROM profiles
					ORDER BY full_name
					"#,
				)
				.fetch_all(&self.pool)
				.await?
			}
		};

		rows.iter().map(row_to_profile).collect()
	}
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, DbError> {
	let id: String = row.get("id");
	let role: String = row.get("role");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Profile {
		id: parse("profile id", &id)?,
		organization_id: parse_opt("organization_id", row.get("organization_id"))?,
		email: row.get("email"),
		full_name: row.get("full_name"),
		role: parse("role", &role)?,
		created_at: parse_time("created_at", &created_at)?,
		updated_at: parse_time("updated_at", &updated_at)?,
	})
}

#[async_trait]
impl ProfileStore for ProfileRepository {
	async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, DbError> {
		self.get_profile(id).await
	}

	async fn create_profile(&self, profile: &Profile) -> Result<(), DbError> {
		self.create_profile(profile).await
	}

	async fn list_profiles(&self, organization_id: Option<OrgId>) -> Result<Vec<Profile>, DbError> {
		self.list_profiles(organization_id).await
	}
}
