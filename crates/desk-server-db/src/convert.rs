// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decoding helpers for values stored as TEXT.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::DbError;

pub(crate) fn parse<T>(field: &str, value: &str) -> Result<T, DbError>
where
	T: FromStr,
	T::Err: Display,
{
	value
		.parse()
		.map_err(|e| DbError::Internal(format!("Invalid {field} '{value}': {e}")))
}

pub(crate) fn parse_opt<T>(field: &str, value: Option<String>) -> Result<Option<T>, DbError>
where
	T: FromStr,
	T::Err: Display,
{
	value.map(|v| parse(field, &v)).transpose()
}

pub(crate) fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {field}: {e}")))
}

pub(crate) fn parse_time_opt(
	field: &str,
	value: Option<String>,
) -> Result<Option<DateTime<Utc>>, DbError> {
	value.map(|v| parse_time(field, &v)).transpose()
}
