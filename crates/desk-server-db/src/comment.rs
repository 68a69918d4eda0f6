// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use desk_policy::{TicketComment, TicketId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::convert::{parse, parse_time};
use crate::error::DbError;

#[async_trait]
pub trait CommentStore: Send + Sync {
	async fn create_comment(&self, comment: &TicketComment) -> Result<(), DbError>;

	/// Comments on a ticket, oldest first.
	async fn list_comments(&self, ticket_id: &TicketId) -> Result<Vec<TicketComment>, DbError>;
}

#[derive(Clone)]
pub struct CommentRepository {
	pool: SqlitePool,
}

impl CommentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, comment), fields(comment_id = %comment.id, ticket_id = %comment.ticket_id))]
	pub async fn create_comment(&self, comment: &TicketComment) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO ticket_comments (id, ticket_id, organization_id, author_id, body, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(comment.id.to_string())
		.bind(comment.ticket_id.to_string())
		.bind(comment.organization_id.to_string())
		.bind(comment.author_id.to_string())
		.bind(&comment.body)
		.bind(comment.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
	pub async fn list_comments(&self, ticket_id: &TicketId) -> Result<Vec<TicketComment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, ticket_id, organization_id, author_id, body, created_at
			FROM ticket_comments
			WHERE ticket_id = ?
			ORDER BY created_at, rowid
			"#,
		)
		.bind(ticket_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_comment).collect()
	}
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<TicketComment, DbError> {
	let id: String = row.get("id");
	let ticket_id: String = row.get("ticket_id");
	let organization_id: String = row.get("organization_id");
	let author_id: String = row.get("author_id");
	let created_at: String = row.get("created_at");

	Ok(TicketComment {
		id: parse("comment id", &id)?,
		ticket_id: parse("ticket_id", &ticket_id)?,
		organization_id: parse("organization_id", &organization_id)?,
		author_id: parse("author_id", &author_id)?,
		body: row.get("body"),
		created_at: parse_time("created_at", &created_at)?,
	})
}

#[async_trait]
impl CommentStore for CommentRepository {
	async fn create_comment(&self, comment: &TicketComment) -> Result<(), DbError> {
		self.create_comment(comment).await
	}

	async fn list_comments(&self, ticket_id: &TicketId) -> Result<Vec<TicketComment>, DbError> {
		self.list_comments(ticket_id).await
	}
}
