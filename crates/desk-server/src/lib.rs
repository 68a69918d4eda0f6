// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Desk help-desk ticket server.
//!
//! The HTTP layer resolves the caller from the identity header, hands the
//! request to a service, and the service runs the `desk-policy` engine between
//! a fetch and a versioned write.

pub mod api;
pub mod api_docs;
pub mod audit;
pub mod directory;
pub mod error;
pub mod extract;
pub mod health;
pub mod routes;
pub mod service;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use desk_server_config::ServerConfig;
pub use error::ServerError;
pub use service::{TicketFilter, TicketService};
