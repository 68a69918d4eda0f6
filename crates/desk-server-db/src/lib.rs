// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Desk server.
//!
//! Each table family has a `*Store` trait and a `*Repository` backed by a
//! [`sqlx::SqlitePool`]. Ticket writes go through [`TicketStore::persist`],
//! which only succeeds if the stored version still matches the one the
//! caller read.

mod convert;
pub mod audit;
pub mod comment;
pub mod error;
pub mod migrate;
pub mod notification;
pub mod org;
pub mod pool;
pub mod profile;
pub mod ticket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use audit::{AuditRepository, AuditStore};
pub use comment::{CommentRepository, CommentStore};
pub use error::{DbError, Result};
pub use migrate::run_migrations;
pub use notification::{NotificationRepository, NotificationSink, StoredNotification};
pub use org::{OrgRepository, OrgStore};
pub use pool::create_pool;
pub use profile::{ProfileRepository, ProfileStore};
pub use ticket::{TicketQuery, TicketRepository, TicketStore};
