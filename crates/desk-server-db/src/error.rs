// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	/// A concurrent write won, or a unique constraint was violated.
	#[error("Conflict: {0}")]
	Conflict(String),

	/// Stored data could not be decoded.
	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl DbError {
	pub fn is_conflict(&self) -> bool {
		matches!(self, DbError::Conflict(_))
	}
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Maps unique constraint violations to [`DbError::Conflict`].
pub(crate) fn unique_violation(err: sqlx::Error, what: &str) -> DbError {
	match &err {
		sqlx::Error::Database(db) if db.is_unique_violation() => {
			DbError::Conflict(format!("{what} already exists"))
		}
		_ => DbError::Sqlx(err),
	}
}
