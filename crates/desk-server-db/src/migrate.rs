// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	(
		"001_organizations_profiles",
		include_str!("../migrations/001_organizations_profiles.sql"),
	),
	("002_tickets", include_str!("../migrations/002_tickets.sql")),
	(
		"003_notifications_audit",
		include_str!("../migrations/003_notifications_audit.sql"),
	),
];

/// Apply every migration. Statements are idempotent, so this is safe to run
/// on each start.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for stmt in sql.split(';').filter(|s| !s.trim().is_empty()) {
			if let Err(e) = sqlx::query(stmt).execute(pool).await {
				if !e.to_string().contains("already exists") {
					tracing::error!(migration = name, error = %e, "migration failed");
					return Err(e.into());
				}
			}
		}
		tracing::debug!(migration = name, "migration applied");
	}
	Ok(())
}
