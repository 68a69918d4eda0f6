// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the Desk HTTP API.
//!
//! Domain types from `desk-policy` are reused as response bodies where they
//! already have the right shape; this crate adds requests, list envelopes and
//! the error body.

pub mod admin;
pub mod error;
pub mod orgs;
pub mod tickets;
pub mod users;

pub use admin::{AuditLogEntryResponse, BreakGlassRequest, ListAuditLogsParams, ListAuditLogsResponse};
pub use error::ErrorResponse;
pub use orgs::{CreateOrgRequest, ListOrgsResponse};
pub use tickets::{
	AssignContractorRequest, CreateTicketRequest, ListMessagesResponse, ListTicketsParams,
	ListTicketsResponse, ListUpdatesResponse, PostMessageRequest, UpdateStatusRequest,
};
pub use users::{CreateProfileRequest, ListProfilesParams, ListProfilesResponse, ProfileResponse};
