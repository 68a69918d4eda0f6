// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ticket service tuning.

use serde::Deserialize;

const DEFAULT_CONFLICT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketsConfig {
	/// How many times a fetch, decide, persist cycle is attempted before a
	/// version conflict is reported to the caller.
	pub conflict_retry_attempts: u32,
	/// Record notification intents for ticket events.
	pub notifications_enabled: bool,
	pub default_page_size: u32,
	pub max_page_size: u32,
}

impl Default for TicketsConfig {
	fn default() -> Self {
		TicketsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketsConfigLayer {
	#[serde(default)]
	pub conflict_retry_attempts: Option<u32>,
	#[serde(default)]
	pub notifications_enabled: Option<bool>,
	#[serde(default)]
	pub default_page_size: Option<u32>,
	#[serde(default)]
	pub max_page_size: Option<u32>,
}

impl TicketsConfigLayer {
	pub fn merge(&mut self, other: TicketsConfigLayer) {
		if other.conflict_retry_attempts.is_some() {
			self.conflict_retry_attempts = other.conflict_retry_attempts;
		}
		if other.notifications_enabled.is_some() {
			self.notifications_enabled = other.notifications_enabled;
		}
		if other.default_page_size.is_some() {
			self.default_page_size = other.default_page_size;
		}
		if other.max_page_size.is_some() {
			self.max_page_size = other.max_page_size;
		}
	}

	pub fn finalize(self) -> TicketsConfig {
		TicketsConfig {
			conflict_retry_attempts: self
				.conflict_retry_attempts
				.unwrap_or(DEFAULT_CONFLICT_RETRY_ATTEMPTS),
			notifications_enabled: self.notifications_enabled.unwrap_or(true),
			default_page_size: self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
			max_page_size: self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE),
		}
	}
}
