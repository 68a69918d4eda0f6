// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification outbox.
//!
//! Intents produced by ticket operations are written as `pending` rows. A
//! separate delivery worker (not part of this server) drains them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use desk_policy::{NotificationChannel, NotificationIntent, OrgId, TicketId, UserId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::convert::{parse, parse_time};
use crate::error::DbError;

pub const STATUS_PENDING: &str = "pending";

/// Accepts notification intents for later delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
	async fn emit(&self, intent: &NotificationIntent) -> Result<(), DbError>;
}

/// An outbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNotification {
	pub id: Uuid,
	pub user_id: UserId,
	pub ticket_id: TicketId,
	pub organization_id: OrgId,
	pub message: String,
	pub channel: NotificationChannel,
	pub status: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct NotificationRepository {
	pool: SqlitePool,
}

impl NotificationRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, intent), fields(user_id = %intent.user_id, ticket_id = %intent.ticket_id, channel = %intent.channel))]
	pub async fn enqueue(&self, intent: &NotificationIntent) -> Result<Uuid, DbError> {
		let id = Uuid::new_v4();
		sqlx::query(
			r#"
			INSERT INTO notifications (id, user_id, ticket_id, organization_id, message, channel, status, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(intent.user_id.to_string())
		.bind(intent.ticket_id.to_string())
		.bind(intent.organization_id.to_string())
		.bind(&intent.message)
		.bind(intent.channel.as_str())
		.bind(STATUS_PENDING)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(id)
	}

	/// Pending notifications for one user, oldest first.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_pending(&self, user_id: &UserId) -> Result<Vec<StoredNotification>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, user_id, ticket_id, organization_id, message, channel, status, created_at
			FROM notifications
			WHERE user_id = ? AND status = ?
			ORDER BY created_at, rowid
			"#,
		)
		.bind(user_id.to_string())
		.bind(STATUS_PENDING)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_notification).collect()
	}
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<StoredNotification, DbError> {
	let id: String = row.get("id");
	let user_id: String = row.get("user_id");
	let ticket_id: String = row.get("ticket_id");
	let organization_id: String = row.get("organization_id");
	let channel: String = row.get("channel");
	let created_at: String = row.get("created_at");

	Ok(StoredNotification {
		id: parse("notification id", &id)?,
		user_id: parse("user_id", &user_id)?,
		ticket_id: parse("ticket_id", &ticket_id)?,
		organization_id: parse("organization_id", &organization_id)?,
		message: row.get("message"),
		channel: parse("channel", &channel)?,
		status: row.get("status"),
		created_at: parse_time("created_at", &created_at)?,
	})
}

#[async_trait]
impl NotificationSink for NotificationRepository {
	async fn emit(&self, intent: &NotificationIntent) -> Result<(), DbError> {
		self.enqueue(intent).await.map(|_| ())
	}
}
