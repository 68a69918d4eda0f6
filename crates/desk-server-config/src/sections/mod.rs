// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a resolved `*Config` and a partial
//! `*ConfigLayer` used while merging sources.

mod auth;
mod database;
mod http;
mod logging;
mod tickets;

pub use auth::{AuthConfig, AuthConfigLayer, DEFAULT_IDENTITY_HEADER};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use tickets::{TicketsConfig, TicketsConfigLayer};
