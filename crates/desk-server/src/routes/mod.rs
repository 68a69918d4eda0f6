// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP route handlers.

pub mod admin;
pub mod docs;
pub mod health;
pub mod orgs;
pub mod tickets;
pub mod users;
