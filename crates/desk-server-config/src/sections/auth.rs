// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request identity configuration.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! profile id in a request header.

use serde::Deserialize;

pub const DEFAULT_IDENTITY_HEADER: &str = "x-desk-user-id";

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Lower-cased header name carrying the caller's profile id.
	pub identity_header: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub identity_header: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.identity_header.is_some() {
			self.identity_header = other.identity_header;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			identity_header: self
				.identity_header
				.map(|h| h.trim().to_ascii_lowercase())
				.unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string()),
		}
	}
}
