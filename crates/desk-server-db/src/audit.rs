// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use desk_policy::{AuditEventType, AuditLogEntry};
use sqlx::{sqlite::SqlitePool, Row};

use crate::convert::{parse, parse_opt, parse_time};
use crate::error::DbError;

#[async_trait]
pub trait AuditStore: Send + Sync {
	async fn record(&self, entry: &AuditLogEntry) -> Result<(), DbError>;

	/// Newest first. Returns the page and the total matching count.
	async fn query_logs(
		&self,
		event_type: Option<AuditEventType>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<AuditLogEntry>, i64), DbError>;
}

#[derive(Clone)]
pub struct AuditRepository {
	pool: SqlitePool,
}

impl AuditRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, entry), fields(event_type = %entry.event_type, action = %entry.action))]
	pub async fn record(&self, entry: &AuditLogEntry) -> Result<(), DbError> {
		let details = match &entry.details {
			serde_json::Value::Null => None,
			value => Some(serde_json::to_string(value)?),
		};

		sqlx::query(
			r#"
			INSERT INTO audit_logs (
				id, timestamp, event_type, actor_user_id, organization_id,
				resource_type, resource_id, action, details
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(entry.id.to_string())
		.bind(entry.timestamp.to_rfc3339())
		.bind(entry.event_type.to_string())
		.bind(entry.actor_user_id.map(|id| id.to_string()))
		.bind(entry.organization_id.map(|id| id.to_string()))
		.bind(&entry.resource_type)
		.bind(&entry.resource_id)
		.bind(&entry.action)
		.bind(details)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn query_logs(
		&self,
		event_type: Option<AuditEventType>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<AuditLogEntry>, i64), DbError> {
		let limit = limit.clamp(1, 1000);
		let event_type = event_type.map(|e| e.to_string());

		let mut conditions = vec!["1=1"];
		if event_type.is_some() {
			conditions.push("event_type = ?");
		}
		let where_clause = conditions.join(" AND ");

		let count_sql = format!("SELECT COUNT(*) as cnt FROM audit_logs WHERE {where_clause}");
		let mut count_query = sqlx::query(&count_sql);
		if let Some(v) = &event_type {
			count_query = count_query.bind(v.as_str());
		}
		let total: i64 = count_query.fetch_one(&self.pool).await?.get("cnt");

		let data_sql = format!(
			"SELECT id, timestamp, event_type, actor_user_id, organization_id, resource_type, \
			 resource_id, action, details FROM audit_logs WHERE {where_clause} \
			 ORDER BY timestamp DESC LIMIT ? OFFSET ?"
		);
		let mut data_query = sqlx::query(&data_sql);
		if let Some(v) = &event_type {
			data_query = data_query.bind(v.as_str());
		}
		let rows = data_query
			.bind(limit)
			.bind(offset.max(0))
			.fetch_all(&self.pool)
			.await?;

		let logs = rows.iter().map(row_to_entry).collect::<Result<Vec<_>, _>>()?;
		Ok((logs, total))
	}
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<AuditLogEntry, DbError> {
	let id: String = row.get("id");
	let timestamp: String = row.get("timestamp");
	let event_type: String = row.get("event_type");
	let details: Option<String> = row.get("details");

	Ok(AuditLogEntry {
		id: parse("audit id", &id)?,
		timestamp: parse_time("timestamp", &timestamp)?,
		event_type: serde_json::from_value(serde_json::Value::String(event_type))?,
		actor_user_id: parse_opt("actor_user_id", row.get("actor_user_id"))?,
		organization_id: parse_opt("organization_id", row.get("organization_id"))?,
		resource_type: row.get("resource_type"),
		resource_id: row.get("resource_id"),
		action: row.get("action"),
		details: details
			.map(|s| serde_json::from_str(&s))
			.transpose()?
			.unwrap_or(serde_json::Value::Null),
	})
}

#[async_trait]
impl AuditStore for AuditRepository {
	async fn record(&self, entry: &AuditLogEntry) -> Result<(), DbError> {
		self.record(entry).await
	}

	async fn query_logs(
		&self,
		event_type: Option<AuditEventType>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<AuditLogEntry>, i64), DbError> {
		self.query_logs(event_type, limit, offset).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_pool;
	use chrono::{Duration, Utc};
	use desk_policy::{break_glass, Action, Actor, DenyReason, OrgId, PolicyError, Role, UserId};

	#[tokio::test]
	async fn records_round_trip_newest_first() {
		let repo = AuditRepository::new(create_migrated_pool().await);
		let admin = Actor::super_admin(UserId::generate());
		let now = Utc::now();

		let glass = break_glass(&admin, "payroll outage", None, now).unwrap();
		let denied = AuditLogEntry::access_denied(
			&Actor::member(UserId::generate(), Role::User, OrgId::generate()),
			Action::AssignContractor,
			&PolicyError::Denied(DenyReason::RoleNotPermitted),
		)
		.at(now + Duration::seconds(1))
		.build();

		repo.record(&glass).await.unwrap();
		repo.record(&denied).await.unwrap();

		let (logs, total) = repo.query_logs(None, 50, 0).await.unwrap();
		assert_eq!(total, 2);
		assert_eq!(logs[0].id, denied.id);
		assert_eq!(logs[1].details["reason"], "payroll outage");

		let (only_glass, total) = repo
			.query_logs(Some(AuditEventType::BreakGlass), 50, 0)
			.await
			.unwrap();
		assert_eq!(total, 1);
		assert_eq!(only_glass[0].event_type, AuditEventType::BreakGlass);
		assert_eq!(only_glass[0].actor_user_id, Some(admin.id));
	}
}
