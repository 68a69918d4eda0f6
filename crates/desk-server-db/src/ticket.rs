// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ticket repository.
//!
//! Every write stores the ticket row and its appended [`TicketUpdate`] in one
//! transaction. Updates are a compare-and-swap on `version`: a caller that
//! read version `n` can only write if the row is still at `n`, and the row
//! moves to `n + 1`.

use async_trait::async_trait;
use desk_policy::{
	Ticket, TicketCategory, TicketId, TicketPriority, TicketScope, TicketStatus, TicketUpdate,
};
use sqlx::{sqlite::SqlitePool, Row, Sqlite, Transaction};

use crate::convert::{parse, parse_opt, parse_time, parse_time_opt};
use crate::error::DbError;

const TICKET_COLUMNS: &str = "id, organization_id, title, description, status, priority, category, \
	site_location, requester_id, admin_id, contractor_id, contractor_name, estimated_duration, \
	scheduled_arrival, created_at, updated_at, version";

/// Filters and paging for ticket listings.
#[derive(Debug, Clone)]
pub struct TicketQuery {
	/// Which tickets the caller may see at all.
	pub scope: TicketScope,
	pub status: Option<TicketStatus>,
	pub priority: Option<TicketPriority>,
	pub category: Option<TicketCategory>,
	pub limit: u32,
	pub offset: u32,
}

impl TicketQuery {
	pub fn new(scope: TicketScope, limit: u32, offset: u32) -> Self {
		Self {
			scope,
			status: None,
			priority: None,
			category: None,
			limit,
			offset,
		}
	}
}

#[async_trait]
pub trait TicketStore: Send + Sync {
	/// Insert a new ticket with its `created` update. The stored ticket starts
	/// at version 1.
	async fn create_ticket(&self, ticket: &Ticket, update: &TicketUpdate) -> Result<Ticket, DbError>;

	async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>, DbError>;

	/// Write a mutated ticket and append `update`, provided the stored row is
	/// still at `expected_version`.
	///
	/// # Errors
	/// `DbError::Conflict` when another write got there first.
	async fn persist(
		&self,
		ticket: &Ticket,
		expected_version: u64,
		update: &TicketUpdate,
	) -> Result<Ticket, DbError>;

	/// Returns one page of tickets and the total matching count.
	async fn list_tickets(&self, query: &TicketQuery) -> Result<(Vec<Ticket>, u64), DbError>;

	/// Ticket history, oldest first.
	async fn list_updates(&self, ticket_id: &TicketId) -> Result<Vec<TicketUpdate>, DbError>;

	async fn health_check(&self) -> Result<(), DbError>;
}

#[derive(Clone)]
pub struct TicketRepository {
	pool: SqlitePool,
}

impl TicketRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	#[tracing::instrument(skip(self, ticket, update), fields(ticket_id = %ticket.id, org_id = %ticket.organization_id))]
	pub async fn create_ticket(&self, ticket: &Ticket, update: &TicketUpdate) -> Result<Ticket, DbError> {
		let mut stored = ticket.clone();
		stored.version = 1;

		let mut tx = self.pool.begin().await?;
		sqlx::query(
			r#"
			INSERT INTO tickets (
				id, organization_id, title, description, status, priority, category,
				site_location, requester_id, admin_id, contractor_id, contractor_name,
				estimated_duration, scheduled_arrival, created_at, updated_at, version
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(stored.id.to_string())
		.bind(stored.organization_id.to_string())
		.bind(&stored.title)
		.bind(&stored.description)
		.bind(stored.status.as_str())
		.bind(stored.priority.as_str())
		.bind(stored.category.as_str())
		.bind(&stored.site_location)
		.bind(stored.requester_id.to_string())
		.bind(stored.admin_id.map(|id| id.to_string()))
		.bind(stored.contractor_id.map(|id| id.to_string()))
		.bind(&stored.contractor_name)
		.bind(stored.estimated_duration.map(i64::from))
		.bind(stored.scheduled_arrival.map(|t| t.to_rfc3339()))
		.bind(stored.created_at.to_rfc3339())
		.bind(stored.updated_at.to_rfc3339())
		.bind(stored.version as i64)
		.execute(&mut *tx)
		.await?;

		insert_update(&mut tx, update).await?;
		tx.commit().await?;

		tracing::debug!(ticket_id = %stored.id, "ticket created");
		Ok(stored)
	}

	#[tracing::instrument(skip(self), fields(ticket_id = %id))]
	pub async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>, DbError> {
		let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?");
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_ticket(&r)).transpose()
	}

	#[tracing::instrument(
		skip(self, ticket, update),
		fields(ticket_id = %ticket.id, expected_version, update_type = %update.update_type)
	)]
	pub async fn persist(
		&self,
		ticket: &Ticket,
		expected_version: u64,
		update: &TicketUpdate,
	) -> Result<Ticket, DbError> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			UPDATE tickets
			SET title = ?, description = ?, status = ?, priority = ?, category = ?,
				site_location = ?, admin_id = ?, contractor_id = ?, contractor_name = ?,
				estimated_duration = ?, scheduled_arrival = ?, updated_at = ?,
				version = version + 1
			WHERE id = ? AND version = ?
			"#,
		)
		.bind(&ticket.title)
		.bind(&ticket.description)
		.bind(ticket.status.as_str())
		.bind(ticket.priority.as_str())
		.bind(ticket.category.as_str())
		.bind(&ticket.site_location)
		.bind(ticket.admin_id.map(|id| id.to_string()))
		.bind(ticket.contractor_id.map(|id| id.to_string()))
		.bind(&ticket.contractor_name)
		.bind(ticket.estimated_duration.map(i64::from))
		.bind(ticket.scheduled_arrival.map(|t| t.to_rfc3339()))
		.bind(ticket.updated_at.to_rfc3339())
		.bind(ticket.id.to_string())
		.bind(expected_version as i64)
		.execute(&mut *tx)
		.await?;

		if result.rows_affected() == 0 {
			let found: Option<(i64,)> = sqlx::query_as("SELECT version FROM tickets WHERE id = ?")
				.bind(ticket.id.to_string())
				.fetch_optional(&mut *tx)
				.await?;
			return Err(match found {
				Some((version,)) => {
					tracing::debug!(expected_version, found = version, "ticket version conflict");
					DbError::Conflict(format!(
						"expected version {expected_version}, found {version}"
					))
				}
				None => DbError::NotFound(format!("ticket {}", ticket.id)),
			});
		}

		insert_update(&mut tx, update).await?;
		tx.commit().await?;

		let mut stored = ticket.clone();
		stored.version = expected_version + 1;
		Ok(stored)
	}

	#[tracing::instrument(skip(self, query), fields(scope = ?query.scope, limit = query.limit, offset = query.offset))]
	pub async fn list_tickets(&self, query: &TicketQuery) -> Result<(Vec<Ticket>, u64), DbError> {
		let mut conditions: Vec<&str> = Vec::new();
		let mut binds: Vec<String> = Vec::new();

		match query.scope {
			TicketScope::Nothing => return Ok((Vec::new(), 0)),
			TicketScope::All => {}
			TicketScope::Organization(org) => {
				conditions.push("organization_id = ?");
				binds.push(org.to_string());
			}
			TicketScope::Contractor {
				organization_id,
				contractor_id,
			} => match organization_id {
				Some(org) => {
					conditions.push(
						"(requester_id = ? OR contractor_id = ? OR (status = 'open' AND organization_id = ?))",
					);
					binds.push(contractor_id.to_string());
					binds.push(contractor_id.to_string());
					binds.push(org.to_string());
				}
				None => {
					conditions.push("(requester_id = ? OR contractor_id = ?)");
					binds.push(contractor_id.to_string());
					binds.push(contractor_id.to_string());
				}
			},
			TicketScope::Requester(user) => {
				conditions.push("requester_id = ?");
				binds.push(user.to_string());
			}
		}

		if let Some(status) = query.status {
			conditions.push("status = ?");
			binds.push(status.as_str().to_string());
		}
		if let Some(priority) = query.priority {
			conditions.push("priority = ?");
			binds.push(priority.as_str().to_string());
		}
		if let Some(category) = query.category {
			conditions.push("category = ?");
			binds.push(category.as_str().to_string());
		}

		let where_clause = if conditions.is_empty() {
			"1=1".to_string()
		} else {
			conditions.join(" AND ")
		};

		let count_sql = format!("SELECT COUNT(*) AS cnt FROM tickets WHERE {where_clause}");
		let mut count_query = sqlx::query(&count_sql);
		for value in &binds {
			count_query = count_query.bind(value.as_str());
		}
		let total: i64 = count_query.fetch_one(&self.pool).await?.get("cnt");

		let data_sql = format!(
			"SELECT {TICKET_COLUMNS} FROM tickets WHERE {where_clause} \
			 ORDER BY created_at DESC, id LIMIT ? OFFSET ?"
		);
		let mut data_query = sqlx::query(&data_sql);
		for value in &binds {
			data_query = data_query.bind(value.as_str());
		}
		let rows = data_query
			.bind(i64::from(query.limit))
			.bind(i64::from(query.offset))
			.fetch_all(&self.pool)
			.await?;

		let tickets = rows.iter().map(row_to_ticket).collect::<Result<Vec<_>, _>>()?;
		Ok((tickets, total.max(0) as u64))
	}

	#[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
	pub async fn list_updates(&self, ticket_id: &TicketId) -> Result<Vec<TicketUpdate>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, ticket_id, update_type, old_status, new_status, actor_id, note, created_at
			FROM ticket_updates
			WHERE ticket_id = ?
			ORDER BY created_at, rowid
			"#,
		)
		.bind(ticket_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_update).collect()
	}

	#[tracing::instrument(skip(self))]
	pub async fn health_check(&self) -> Result<(), DbError> {
		sqlx::query("SELECT 1").execute(&self.pool).await?;
		Ok(())
	}
}

async fn insert_update(
	tx: &mut Transaction<'_, Sqlite>,
	update: &TicketUpdate,
) -> Result<(), DbError> {
	sqlx::query(
		r#"
		INSERT INTO ticket_updates (id, ticket_id, update_type, old_status, new_status, actor_id, note, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(update.id.to_string())
	.bind(update.ticket_id.to_string())
	.bind(update.update_type.as_str())
	.bind(update.old_status.map(|s| s.as_str()))
	.bind(update.new_status.map(|s| s.as_str()))
	.bind(update.actor_id.to_string())
	.bind(&update.note)
	.bind(update.created_at.to_rfc3339())
	.execute(&mut **tx)
	.await?;
	Ok(())
}

fn row_to_ticket(row: &sqlx::sqlite::SqliteRow) -> Result<Ticket, DbError> {
	let id: String = row.get("id");
	let organization_id: String = row.get("organization_id");
	let status: String = row.get("status");
	let priority: String = row.get("priority");
	let category: String = row.get("category");
	let requester_id: String = row.get("requester_id");
	let estimated_duration: Option<i64> = row.get("estimated_duration");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");
	let version: i64 = row.get("version");

	Ok(Ticket {
		id: parse("ticket id", &id)?,
		organization_id: parse("organization_id", &organization_id)?,
		title: row.get("title"),
		description: row.get("description"),
		status: parse("status", &status)?,
		priority: parse("priority", &priority)?,
		category: parse("category", &category)?,
		site_location: row.get("site_location"),
		requester_id: parse("requester_id", &requester_id)?,
		admin_id: parse_opt("admin_id", row.get("admin_id"))?,
		contractor_id: parse_opt("contractor_id", row.get("contractor_id"))?,
		contractor_name: row.get("contractor_name"),
		estimated_duration: estimated_duration
			.map(u32::try_from)
			.transpose()
			.map_err(|e| DbError::Internal(format!("Invalid estimated_duration: {e}")))?,
		scheduled_arrival: parse_time_opt("scheduled_arrival", row.get("scheduled_arrival"))?,
		created_at: parse_time("created_at", &created_at)?,
		updated_at: parse_time("updated_at", &updated_at)?,
		version: u64::try_from(version)
			.map_err(|e| DbError::Internal(format!("Invalid version: {e}")))?,
	})
}

fn row_to_update(row: &sqlx::sqlite::SqliteRow) -> Result<TicketUpdate, DbError> {
	let id: String = row.get("id");
	let ticket_id: String = row.get("ticket_id");
	let update_type: String = row.get("update_type");
	let actor_id: String = row.get("actor_id");
	let created_at: String = row.get("created_at");

	Ok(TicketUpdate {
		id: parse("update id", &id)?,
		ticket_id: parse("ticket_id", &ticket_id)?,
		update_type: parse("update_type", &update_type)?,
		old_status: parse_opt("old_status", row.get("old_status"))?,
		new_status: parse_opt("new_status", row.get("new_status"))?,
		actor_id: parse("actor_id", &actor_id)?,
		note: row.get("note"),
		created_at: parse_time("created_at", &created_at)?,
	})
}

#[async_trait]
impl TicketStore for TicketRepository {
	async fn create_ticket(&self, ticket: &Ticket, update: &TicketUpdate) -> Result<Ticket, DbError> {
		self.create_ticket(ticket, update).await
	}

	async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>, DbError> {
		self.get_ticket(id).await
	}

	async fn persist(
		&self,
		ticket: &Ticket,
		expected_version: u64,
		update: &TicketUpdate,
	) -> Result<Ticket, DbError> {
		self.persist(ticket, expected_version, update).await
	}

	async fn list_tickets(&self, query: &TicketQuery) -> Result<(Vec<Ticket>, u64), DbError> {
		self.list_tickets(query).await
	}

	async fn list_updates(&self, ticket_id: &TicketId) -> Result<Vec<TicketUpdate>, DbError> {
		self.list_updates(ticket_id).await
	}

	async fn health_check(&self) -> Result<(), DbError> {
		self.health_check().await
	}
}
