// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization repository.

use async_trait::async_trait;
use desk_policy::{OrgId, Organization};
use sqlx::{sqlite::SqlitePool, Row};

use crate::convert::{parse, parse_time};
use crate::error::{unique_violation, DbError};

#[async_trait]
pub trait OrgStore: Send + Sync {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError>;
	async fn get_org(&self, id: &OrgId) -> Result<Option<Organization>, DbError>;
	async fn list_orgs(&self) -> Result<Vec<Organization>, DbError>;
}

#[derive(Clone)]
pub struct OrgRepository {
	pool: SqlitePool,
}

impl OrgRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// Returns `DbError::Conflict` if the domain is already taken.
	#[tracing::instrument(skip(self, org), fields(org_id = %org.id, domain = %org.domain))]
	pub async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO organizations (id, name, domain, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(org.id.to_string())
		.bind(&org.name)
		.bind(&org.domain)
		.bind(org.created_at.to_rfc3339())
		.bind(org.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| unique_violation(e, "organization domain"))?;

		tracing::debug!(org_id = %org.id, "organization created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(org_id = %id))]
	pub async fn get_org(&self, id: &OrgId) -> Result<Option<Organization>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, domain, created_at, updated_at
			FROM organizations
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_org(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_orgs(&self) -> Result<Vec<Organization>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, domain, created_at, updated_at
			FROM organizations
			ORDER BY name
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_org).collect()
	}
}

fn row_to_org(row: &sqlx::sqlite::SqliteRow) -> Result<Organization, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Organization {
		id: parse("org id", &id)?,
		name: row.get("name"),
		domain: row.get("domain"),
		created_at: parse_time("created_at", &created_at)?,
		updated_at: parse_time("updated_at", &updated_at)?,
	})
}

#[async_trait]
impl OrgStore for OrgRepository {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		self.create_org(org).await
	}

	async fn get_org(&self, id: &OrgId) -> Result<Option<Organization>, DbError> {
		self.get_org(id).await
	}

	async fn list_orgs(&self) -> Result<Vec<Organization>, DbError> {
		self.list_orgs().await
	}
}
