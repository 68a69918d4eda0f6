// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and environment
//! variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, TicketsConfigLayer,
};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/desk/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file is treated as empty.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: DESK_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		load_from(&|name| std::env::var(name).ok())
	}
}

/// Builds a layer from a variable lookup. Empty values count as unset.
fn load_from(lookup: &dyn Fn(&str) -> Option<String>) -> Result<ServerConfigLayer, ConfigError> {
	let env = Env(lookup);
	Ok(ServerConfigLayer {
		http: Some(HttpConfigLayer {
			host: env.var("DESK_SERVER_HOST"),
			port: env.parse("DESK_SERVER_PORT")?,
			base_url: env.var("DESK_SERVER_BASE_URL"),
		}),
		database: Some(DatabaseConfigLayer {
			url: env.var("DESK_SERVER_DATABASE_URL"),
			max_connections: env.parse("DESK_SERVER_DATABASE_MAX_CONNECTIONS")?,
		}),
		logging: Some(LoggingConfigLayer {
			level: env.var("DESK_SERVER_LOG_LEVEL"),
			json: env.bool("DESK_SERVER_LOG_JSON"),
		}),
		auth: Some(AuthConfigLayer {
			identity_header: env.var("DESK_SERVER_AUTH_IDENTITY_HEADER"),
		}),
		tickets: Some(TicketsConfigLayer {
			conflict_retry_attempts: env.parse("DESK_SERVER_TICKETS_CONFLICT_RETRY_ATTEMPTS")?,
			notifications_enabled: env.bool("DESK_SERVER_TICKETS_NOTIFICATIONS_ENABLED"),
			default_page_size: env.parse("DESK_SERVER_TICKETS_DEFAULT_PAGE_SIZE")?,
			max_page_size: env.parse("DESK_SERVER_TICKETS_MAX_PAGE_SIZE")?,
		}),
	})
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
	fn var(&self, name: &str) -> Option<String> {
		(self.0)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {} value '{v}'", std::any::type_name::<T>()),
			}),
			None => Ok(None),
		}
	}
}
