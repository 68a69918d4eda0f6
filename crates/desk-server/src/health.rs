// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check types and component checking logic.

use serde::Serialize;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use utoipa::ToSchema;

use desk_server_db::TicketStore;

const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Unhealthy,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
	pub status: HealthStatus,
	pub latency_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub duration_ms: u64,
	pub version: String,
	pub database: DatabaseHealth,
}

pub async fn check_database(store: &dyn TicketStore) -> DatabaseHealth {
	let start = Instant::now();

	let result = timeout(DB_CHECK_TIMEOUT, store.health_check()).await;
	let latency_ms = start.elapsed().as_millis() as u64;

	match result {
		Ok(Ok(())) => DatabaseHealth {
			status: HealthStatus::Healthy,
			latency_ms,
			error: None,
		},
		Ok(Err(e)) => DatabaseHealth {
			status: HealthStatus::Unhealthy,
			latency_ms,
			error: Some(e.to_string()),
		},
		Err(_) => DatabaseHealth {
			status: HealthStatus::Unhealthy,
			latency_ms,
			error: Some("database health check timed out".to_string()),
		},
	}
}
