// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Desk server.
//!
//! Values are layered from built-in defaults, a TOML file and `DESK_SERVER_*`
//! environment variables, in increasing order of precedence.
//!
//! ```ignore
//! use desk_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub auth: AuthConfig,
	pub tickets: TicketsConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration using the system config file at `/etc/desk/server.toml`.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources by precedence and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer into configuration, applying defaults and
/// cross-field validation.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		database: layer.database.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
		auth: layer.auth.unwrap_or_default().finalize(),
		tickets: layer.tickets.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		identity_header = %config.auth.identity_header,
		conflict_retry_attempts = config.tickets.conflict_retry_attempts,
		notifications_enabled = config.tickets.notifications_enabled,
		"Server configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	let tickets = &config.tickets;
	if tickets.conflict_retry_attempts == 0 {
		return Err(ConfigError::Validation(
			"tickets.conflict_retry_attempts must be at least 1".to_string(),
		));
	}
	if tickets.default_page_size == 0 || tickets.max_page_size == 0 {
		return Err(ConfigError::Validation(
			"ticket page sizes must be positive".to_string(),
		));
	}
	if tickets.default_page_size > tickets.max_page_size {
		return Err(ConfigError::Validation(format!(
			"tickets.default_page_size ({}) exceeds tickets.max_page_size ({})",
			tickets.default_page_size, tickets.max_page_size
		)));
	}
	if config.auth.identity_header.is_empty() {
		return Err(ConfigError::Validation(
			"auth.identity_header must not be empty".to_string(),
		));
	}
	Ok(())
}
